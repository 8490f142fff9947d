use std::path::PathBuf;

/// Errors that can occur across the Quill platform.
///
/// Each variant wraps a specific failure domain so callers can discriminate
/// programmatically. Library crates use this type directly; the binary crate
/// converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use quill_core::QuillError;
///
/// let err = QuillError::Config("invalid language: xx".into());
/// assert!(err.to_string().contains("invalid language"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum QuillError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    DocumentRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// No API key in config and the provider's environment variable is unset.
    #[error("API key not found: set the {0} environment variable or provide api_key in the configuration")]
    MissingApiKey(String),

    /// Requested LLM provider is not recognized.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// LLM transport or provider-side failure.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Provider returned data that does not match the expected response schema.
    #[error("schema validation error: {0}")]
    Schema(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
