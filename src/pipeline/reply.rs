//! Reply composition

use url::Url;

use crate::channels::ReplyPart;
use crate::{Error, Result};

/// Public HTTPS base URL the platform fetches synthesized audio from
#[derive(Debug, Clone)]
pub struct PublicBaseUrl(Url);

impl PublicBaseUrl {
    /// Parse and validate a base URL
    ///
    /// # Errors
    ///
    /// Returns error if the URL is malformed, not HTTPS, or has no host
    pub fn parse(raw: &str) -> Result<Self> {
        let mut url = Url::parse(raw.trim())
            .map_err(|e| Error::Config(format!("invalid public base URL {raw:?}: {e}")))?;

        if url.scheme() != "https" {
            return Err(Error::Config(format!(
                "public base URL must use https, got {raw:?}"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::Config(format!("public base URL has no host: {raw:?}")));
        }

        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self(url))
    }

    /// URL of a file under the `/static` mount
    ///
    /// # Errors
    ///
    /// Returns error if the path cannot be joined onto the base
    pub fn static_url(&self, static_path: &str) -> Result<String> {
        self.0
            .join(&format!("static/{}", static_path.trim_start_matches('/')))
            .map(String::from)
            .map_err(|e| Error::Config(format!("cannot build static URL: {e}")))
    }
}

/// Build the reply for a processed voice message
///
/// Parts appear in fixed order (transcript, translation, audio); blank text
/// parts and missing audio are left out.
#[must_use]
pub fn compose_reply(transcript: &str, translation: &str, audio: Option<(String, u64)>) -> Vec<ReplyPart> {
    let mut parts = Vec::with_capacity(3);

    if !transcript.trim().is_empty() {
        parts.push(ReplyPart::Text(transcript.to_string()));
    }
    if !translation.trim().is_empty() {
        parts.push(ReplyPart::Text(translation.to_string()));
    }
    if let Some((url, duration_ms)) = audio {
        parts.push(ReplyPart::Audio { url, duration_ms });
    }

    parts
}
