//! Error types for descriptor reading and IR emission.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a service descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor file could not be read.
    #[error("cannot read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error.
    #[error("invalid TOML descriptor: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or shape error.
    #[error("invalid JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.toml` nor `.json`.
    #[error("unsupported descriptor format: {0}")]
    UnsupportedFormat(String),

    /// The service itself is unusable (methods are checked later, one by one).
    #[error("invalid service: {0}")]
    InvalidService(String),
}

/// Convenience result type for descriptor operations.
pub type DescriptorResult<T> = Result<T, DescriptorError>;

/// Errors that can occur in the generation pipeline.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Descriptor could not be loaded.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// The backend failed to render the IR.
    #[error("render failed ({backend}): {message}")]
    Render { backend: String, message: String },

    /// Output could not be persisted.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for codegen operations.
pub type CodegenResult<T> = Result<T, CodegenError>;
