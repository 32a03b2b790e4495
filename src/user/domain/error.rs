//! Error types for user domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The username is shorter or longer than allowed.
    #[error("username must be between {min} and {max} characters, got {actual}")]
    UsernameLength {
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The username contains characters outside `[A-Za-z0-9_]`.
    #[error("username '{0}' may only contain letters, numbers and underscores")]
    InvalidUsernameCharacters(String),
}

/// Error returned while parsing roles from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
