//! Custom Axum extractors for request authentication.
//!
//! Provides `VerifiedInteraction`, which checks the Ed25519 signature the
//! chat platform attaches to every interaction webhook before decoding the
//! body. All cryptographic operations are delegated to
//! [`cascade_sdk::signature`].

use axum::{
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use cascade_sdk::objects::Interaction;
use cascade_sdk::signature::{SIGNATURE_HEADER, SignatureError, TIMESTAMP_HEADER};

use crate::state::AppState;

/// Interactions are small; anything larger is not from the platform.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// An interaction whose signature has been verified.
///
/// # Header format
///
/// ```text
/// X-Signature-Ed25519:   hex(ed25519(timestamp || body))
/// X-Signature-Timestamp: {timestamp}
/// ```
pub struct VerifiedInteraction(pub Interaction);

/// Errors that can occur during interaction verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifiedInteractionError {
    #[error("missing signature headers")]
    MissingHeader,
    #[error("invalid signature header")]
    InvalidHeader,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("invalid JSON body: {0}")]
    JsonError(serde_json::Error),
}

impl From<SignatureError> for VerifiedInteractionError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidHex(_) | SignatureError::InvalidLength => Self::InvalidHeader,
            SignatureError::SignatureMismatch => Self::VerificationFailed,
        }
    }
}

impl IntoResponse for VerifiedInteractionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            VerifiedInteractionError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "missing signature headers")
            }
            // The platform probes the endpoint with bad signatures and
            // expects a 401 for all of them.
            VerifiedInteractionError::InvalidHeader
            | VerifiedInteractionError::VerificationFailed => {
                (StatusCode::UNAUTHORIZED, "invalid request signature")
            }
            VerifiedInteractionError::BodyReadError => {
                (StatusCode::BAD_REQUEST, "failed to read request body")
            }
            VerifiedInteractionError::JsonError(_) => (StatusCode::BAD_REQUEST, "invalid JSON body"),
        };
        (status, message).into_response()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, VerifiedInteractionError> {
    headers
        .get(name)
        .ok_or(VerifiedInteractionError::MissingHeader)?
        .to_str()
        .map_err(|_| VerifiedInteractionError::InvalidHeader)
}

impl FromRequest<AppState> for VerifiedInteraction {
    type Rejection = VerifiedInteractionError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let signature = header(req.headers(), SIGNATURE_HEADER)?.to_owned();
        let timestamp = header(req.headers(), TIMESTAMP_HEADER)?.to_owned();

        let body = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| VerifiedInteractionError::BodyReadError)?;

        let discord = state.config.discord.read().await;
        discord.public_key.verify(&signature, &timestamp, &body)?;
        drop(discord);

        let interaction =
            serde_json::from_slice(&body).map_err(VerifiedInteractionError::JsonError)?;
        Ok(VerifiedInteraction(interaction))
    }
}
