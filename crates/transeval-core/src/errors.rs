//! Error types for failures that abort a command before any record is processed.

use std::path::PathBuf;

/// Record store load/save failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store file does not exist.
    #[error("record store not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Store file could not be read or written.
    #[error("record store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store file is not a JSON array of records.
    #[error("invalid record store {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        Self::Io { path, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Configuration problems detected while wiring providers.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A credential the selected provider needs is not set.
    #[error("missing credential: {var} must be set for provider '{provider}'")]
    MissingCredential {
        provider: &'static str,
        var: &'static str,
    },

    /// Glossary file could not be read or is not a JSON object of strings.
    #[error("invalid glossary {}: {message}", path.display())]
    Glossary { path: PathBuf, message: String },

    /// HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}
