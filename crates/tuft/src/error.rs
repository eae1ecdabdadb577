//! Error types for tuft

use thiserror::Error;

/// Errors that can occur in tuft operations
#[derive(Error, Debug)]
pub enum Error {
    /// Repository construction error
    #[error("Repository error: {0}")]
    Repo(#[from] tuft_repo::Error),

    /// Client error
    #[error("Client error: {0}")]
    Client(#[from] tuft_client::Error),

    /// Types error
    #[error("Types error: {0}")]
    Types(#[from] tuft_types::Error),

    /// Crypto error
    #[error("Crypto error: {0}")]
    Crypto(#[from] tuft_crypto::Error),
}

/// Result type for tuft operations
pub type Result<T> = std::result::Result<T, Error>;
