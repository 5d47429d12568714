use thiserror::Error;

/// Result type for flux upload operations
pub type FluxResult<T> = Result<T, FluxError>;

/// Errors that can occur while starting, uploading, completing or cancelling an upload
#[derive(Error, Debug)]
pub enum FluxError {
    #[error("Flux file identifier cannot be empty.")]
    EmptyIdentifier,

    #[error("File name must have an extension.")]
    MissingExtension,

    #[error("No chunks found for the specified file.")]
    NoChunksFound,

    #[error("Chunk not found: {name}")]
    NotFound { name: String },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FluxError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// True for failures raised by the storage layer rather than by input validation
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Backend { .. } | Self::Io { .. }
        )
    }
}
