//! Error types for unit-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from unit-core
    #[error(transparent)]
    Core(#[from] unit_core::Error),

    /// Error from unit-reference
    #[error(transparent)]
    Reference(#[from] unit_reference::Error),

    /// Error from unit-template
    #[error(transparent)]
    Template(#[from] unit_template::Error),

    /// Error from unit-fs
    #[error(transparent)]
    Fs(#[from] unit_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
