use crate::models::{OrderStatus, PetStatus};
use thiserror::Error;

/// Every failure a storefront command can report.
///
/// Queries never use the `*NotFound` variants: they return `Option` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Pet with ID {id} not found")]
    PetNotFound { id: String },

    #[error("Pet {id} is not available for adoption (status: {status})")]
    PetUnavailable { id: String, status: PetStatus },

    #[error("Product with ID {id} not found")]
    ProductNotFound { id: String },

    #[error("User with ID {id} not found")]
    UserNotFound { id: String },

    #[error("Order with ID {id} not found")]
    OrderNotFound { id: String },

    #[error("Order {id} cannot be changed while {status}")]
    InvalidOrderState { id: String, status: OrderStatus },

    #[error("Adoption request with ID {id} not found")]
    AdoptionRequestNotFound { id: String },

    #[error("Contact message with ID {id} not found")]
    MessageNotFound { id: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User with this email already exists: {email}")]
    EmailAlreadyRegistered { email: String },

    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Payment for order {order_id} was cancelled")]
    PaymentCancelled { order_id: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
