use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairingError {
    /// The extension was never added (or its record has expired).
    #[error("Extension does not exist: {extension_id}")]
    NotFound { extension_id: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PairingError {
    pub(crate) fn not_found(extension_id: &str) -> Self {
        Self::NotFound {
            extension_id: extension_id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, PairingError>;
