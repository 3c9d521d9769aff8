//! Interaction webhook signature verification.
//!
//! Every interaction POSTed by the chat platform is signed with the
//! application's Ed25519 key. The wire format is:
//!
//! ```text
//! X-Signature-Ed25519:   hex(signature)
//! X-Signature-Timestamp: {unix_timestamp}
//! ```
//!
//! The signed message is `{timestamp}{raw_body}`.

use ring::signature::{ED25519, UnparsedPublicKey};

/// Header carrying the hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Header carrying the timestamp that prefixes the signed message.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

const ED25519_PUBLIC_KEY_LEN: usize = 32;
const ED25519_SIGNATURE_LEN: usize = 64;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid key or signature length")]
    InvalidLength,
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// The application's Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionPublicKey(Box<[u8]>);

impl InteractionPublicKey {
    pub fn from_hex(value: &str) -> Result<Self, SignatureError> {
        let bytes = decode_hex(value)?;
        if bytes.len() != ED25519_PUBLIC_KEY_LEN {
            return Err(SignatureError::InvalidLength);
        }
        Ok(Self(bytes.into_boxed_slice()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != ED25519_PUBLIC_KEY_LEN {
            return Err(SignatureError::InvalidLength);
        }
        Ok(Self(bytes.into()))
    }

    /// Verify `signature_hex` over `{timestamp}{body}`.
    pub fn verify(
        &self,
        signature_hex: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let signature = decode_hex(signature_hex)?;
        if signature.len() != ED25519_SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength);
        }
        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        UnparsedPublicKey::new(&ED25519, &self.0).verify(&message, &signature)?;
        Ok(())
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, SignatureError> {
    Ok(hex::decode(value.trim())?)
}
