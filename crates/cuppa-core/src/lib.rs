//! cuppa-core - Core types for the cuppa coffee-subscription client.

pub mod credentials;
pub mod error;
pub mod timestamp;
pub mod types;

pub use credentials::CredentialState;
pub use error::{ApiError, AuthError, DecodeError, Error, InvalidInputError, TransportError};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
