//! Core types, configuration, and error handling for the Quill reviewer.
//!
//! This crate provides the shared foundation used by the review pipeline and
//! the CLI:
//! - [`QuillError`] — unified error type using `thiserror`
//! - [`resolve`] / [`FileConfig`] / [`Overrides`] — layered configuration
//!   resolution (caller > file > defaults) with fail-fast validation
//! - Shared types: [`Severity`], [`Language`], [`Provider`], [`Document`],
//!   [`ReviewIssue`], [`ReviewResult`]

mod config;
mod error;
mod types;

pub use config::{
    resolve, resolve_api_key, resolve_api_key_with, FileConfig, FileLlmConfig, LlmConfig,
    Overrides, ReviewConfig, SEVERITY_PLACEHOLDER,
};
pub use error::QuillError;
pub use types::{Document, Language, Provider, ReviewIssue, ReviewResult, Severity};

/// A convenience `Result` type for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;
