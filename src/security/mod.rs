//! Security module for webhook authentication

pub mod signature;

pub use signature::{SIGNATURE_HEADER, WebhookVerifier};
