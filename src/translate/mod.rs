//! Machine translation

mod azure;

use async_trait::async_trait;

pub use azure::AzureTranslator;

use crate::Result;

/// Text translation provider
#[async_trait]
pub trait Translator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Translate text into the provider's configured target language
    ///
    /// # Errors
    ///
    /// Returns `Error::Translation` with the service's code and message on failure
    async fn translate(&self, text: &str) -> Result<String>;
}
