use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::error::GatewayError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Invalid product: {0}")]
    ValidationError(String),
    #[error("Product database error: {0}")]
    DatabaseError(#[from] GatewayError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ProductError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Persistence(e) => ProductError::DatabaseError(e),
            FrameworkError::InvalidRecord(reason) => ProductError::ValidationError(reason),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                ProductError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
