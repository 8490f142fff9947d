//! The Quill review pipeline.
//!
//! Provides prompt synthesis, the multi-provider LLM gateway, snippet-to-line
//! reconciliation, and the orchestrator that ties them together:
//! resolve credential → build prompts → call gateway → map lines → filter by
//! severity → assemble the [`quill_core::ReviewResult`].

pub mod linemap;
pub mod llm;
pub mod pipeline;
pub mod prompt;
