//! Relay-specific errors.

use skywatch_core::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Messaging gateway rejected the request ({status}): {message}")]
    GatewayRejected { status: u16, message: String },

    #[error("Messaging gateway credentials are not configured")]
    NotConfigured,
}

impl RelayError {
    /// Message safe to return to the caller of the HTTP API.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) => e.user_message().to_string(),
            Self::GatewayRejected { .. } => {
                "The messaging service could not deliver the report.".to_string()
            }
            Self::NotConfigured => {
                "Messaging is not configured on this server.".to_string()
            }
        }
    }
}
