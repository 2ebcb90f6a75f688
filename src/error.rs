use thiserror::Error;

/// Errors raised by a persistence gateway.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Gateway transport error: {0}")]
    Transport(String),
    #[error("Gateway rejected request with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Row decode error: {0}")]
    Decode(String),
    #[error("Row not found: {0}")]
    NotFound(String),
    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}
