//! LINE webhook signature verification
//!
//! The platform signs each request body with HMAC-SHA256 keyed by the channel secret
//! and sends the base64 digest in the `X-Line-Signature` header.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::{Error, Result};

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

/// Verifies webhook bodies against a channel secret
pub struct WebhookVerifier {
    channel_secret: SecretString,
}

impl WebhookVerifier {
    /// Create a verifier for a channel secret
    #[must_use]
    pub const fn new(channel_secret: SecretString) -> Self {
        Self { channel_secret }
    }

    /// Compute the base64 signature for a body
    ///
    /// # Errors
    ///
    /// Returns error if the secret cannot key the MAC
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(body);
        Ok(base64_encode(&mac.finalize().into_bytes()))
    }

    /// Check a signature header value against a body
    ///
    /// Comparison is constant-time.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signature` if the header is missing, malformed or does not match
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<()> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Signature("missing signature header".to_string()))?;

        let expected = base64_decode(signature)?;

        let mut mac = self.mac()?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| Error::Signature("signature mismatch".to_string()))
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.channel_secret.expose_secret().as_bytes())
            .map_err(|e| Error::Signature(format!("invalid channel secret: {e}")))
    }
}

fn base64_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn base64_decode(data: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::Signature(format!("invalid base64: {e}")))
}
