//! Azure AI Translator (Text Translation v3.0)

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::Translator;
use crate::config::TranslatorConfig;
use crate::{Error, Result};

/// Azure Translator client for a single target language
pub struct AzureTranslator {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    region: Option<String>,
    source_language: Option<String>,
    target_language: String,
}

impl AzureTranslator {
    /// Create a translator
    ///
    /// # Errors
    ///
    /// Returns error if the subscription key is missing
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let api_key = config
            .key
            .as_ref()
            .ok_or_else(|| Error::Config("Azure Translator key required".to_string()))?;

        Ok(Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            region: config.region.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
        })
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    fn name(&self) -> &'static str {
        "azure-translator"
    }

    async fn translate(&self, text: &str) -> Result<String> {
        let url = format!("{}/translate", self.endpoint);

        let mut query = vec![
            ("api-version", "3.0"),
            ("to", self.target_language.as_str()),
        ];
        if let Some(from) = &self.source_language {
            query.push(("from", from.as_str()));
        }

        let mut request = self
            .client
            .post(&url)
            .query(&query)
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose_secret())
            .json(&[InputTextItem { text }]);
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request.send().await.map_err(|e| Error::Translation {
            code: "request".to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Translation {
            code: "response".to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ServiceErrorResponse>(&body) {
                Ok(err) => Error::Translation {
                    code: match err.error.code {
                        serde_json::Value::String(code) => code,
                        other => other.to_string(),
                    },
                    message: err.error.message,
                },
                Err(_) => Error::Translation {
                    code: status.as_u16().to_string(),
                    message: body,
                },
            });
        }

        let items: Vec<TranslatedTextItem> =
            serde_json::from_str(&body).map_err(|e| Error::Translation {
                code: "parse".to_string(),
                message: e.to_string(),
            })?;

        let translation = items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .ok_or_else(|| Error::Translation {
                code: "empty".to_string(),
                message: "service returned no translations".to_string(),
            })?;

        tracing::info!(to = %translation.to, translation = %translation.text, "translation complete");
        Ok(translation.text)
    }
}

#[derive(Serialize)]
struct InputTextItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslatedTextItem {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    to: String,
}

#[derive(Deserialize)]
struct ServiceErrorResponse {
    error: ServiceError,
}

#[derive(Deserialize)]
struct ServiceError {
    code: serde_json::Value,
    message: String,
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn config(endpoint: &str) -> TranslatorConfig {
        TranslatorConfig {
            endpoint: endpoint.to_string(),
            key: Some(SecretString::from("translator-key".to_string())),
            region: Some("eastasia".to_string()),
            source_language: None,
            target_language: "ja".to_string(),
        }
    }

    #[tokio::test]
    async fn test_translate_returns_first_translation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/translate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api-version".into(), "3.0".into()),
                Matcher::UrlEncoded("to".into(), "ja".into()),
            ]))
            .match_header("Ocp-Apim-Subscription-Key", "translator-key")
            .match_header("Ocp-Apim-Subscription-Region", "eastasia")
            .match_body(Matcher::Json(serde_json::json!([{ "Text": "你好" }])))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"detectedLanguage":{"language":"zh-Hans","score":1.0},"translations":[{"text":"こんにちは","to":"ja"}]}]"#,
            )
            .create_async()
            .await;

        let translator = AzureTranslator::new(&config(&server.url())).unwrap();
        let text = translator.translate("你好").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "こんにちは");
    }

    #[tokio::test]
    async fn test_source_language_is_sent_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/translate")
            .match_query(Matcher::UrlEncoded("from".into(), "zh-Hans".into()))
            .with_status(200)
            .with_body(r#"[{"translations":[{"text":"こんにちは","to":"ja"}]}]"#)
            .create_async()
            .await;

        let mut cfg = config(&server.url());
        cfg.source_language = Some("zh-Hans".to_string());
        let translator = AzureTranslator::new(&cfg).unwrap();
        translator.translate("你好").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_service_error_carries_code_and_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/translate")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400036,"message":"The target language is not valid."}}"#)
            .create_async()
            .await;

        let translator = AzureTranslator::new(&config(&server.url())).unwrap();
        let result = translator.translate("你好").await;

        mock.assert_async().await;
        match result {
            Err(Error::Translation { code, message }) => {
                assert_eq!(code, "400036");
                assert_eq!(message, "The target language is not valid.");
            }
            other => panic!("expected translation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_result_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/translate")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let translator = AzureTranslator::new(&config(&server.url())).unwrap();
        let result = translator.translate("你好").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(Error::Translation { .. })));
    }

    #[test]
    fn test_requires_key() {
        let mut cfg = config("https://api.cognitive.microsofttranslator.com");
        cfg.key = None;
        assert!(AzureTranslator::new(&cfg).is_err());
    }
}
