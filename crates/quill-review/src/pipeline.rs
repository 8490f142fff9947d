//! Review orchestration: prompts, gateway call, line mapping, filtering.

use chrono::Utc;
use quill_core::{
    resolve_api_key, Document, QuillError, ReviewConfig, ReviewIssue, ReviewResult, Severity,
};

use crate::linemap;
use crate::llm::{LlmClient, ReviewClient};
use crate::prompt::{self, PromptOptions};

/// Keep only issues at or above `min`, preserving their original order.
///
/// The input is not mutated; survivors are cloned into a new list. For any
/// two thresholds `a > b`, the result for `a` is a subset of the result
/// for `b`.
///
/// # Examples
///
/// ```
/// use quill_core::{ReviewIssue, Severity};
/// use quill_review::pipeline::filter_issues_by_severity;
///
/// let issues = vec![
///     ReviewIssue {
///         severity: Severity::Suggestion,
///         message: "wordy".into(),
///         match_text: None,
///         line_number: None,
///         suggestion: None,
///     },
///     ReviewIssue {
///         severity: Severity::Error,
///         message: "typo".into(),
///         match_text: None,
///         line_number: None,
///         suggestion: None,
///     },
/// ];
/// let kept = filter_issues_by_severity(&issues, Severity::Warning);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].severity, Severity::Error);
/// ```
pub fn filter_issues_by_severity(issues: &[ReviewIssue], min: Severity) -> Vec<ReviewIssue> {
    issues
        .iter()
        .filter(|issue| issue.severity.meets_threshold(min))
        .cloned()
        .collect()
}

/// Orchestrates a single content review.
///
/// Linear sequence with one suspension point (the gateway call): build
/// prompts from the configuration, invoke the client, attach line numbers
/// to issues that carry a match snippet, apply the configured severity
/// filter, and assemble the result. Gateway failures propagate unchanged.
#[derive(Debug)]
pub struct ContentReviewer<C: ReviewClient> {
    config: ReviewConfig,
    client: C,
}

impl<C: ReviewClient> ContentReviewer<C> {
    /// Create a reviewer from a resolved configuration and a gateway client.
    pub fn new(config: ReviewConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Review one document and return the assembled result.
    ///
    /// # Errors
    ///
    /// Propagates [`QuillError::Llm`] and [`QuillError::Schema`] from the
    /// gateway without local recovery.
    pub async fn review(&self, document: &Document) -> Result<ReviewResult, QuillError> {
        let options = PromptOptions {
            instruction: self.config.instruction.as_deref(),
            severity_level: self.config.severity_level,
        };
        let system_prompt = prompt::build_system_prompt(self.config.language, &options);
        let user_prompt = prompt::build_user_prompt(self.config.language, &document.raw_content);

        let response = self
            .client
            .generate_review(&system_prompt, &user_prompt)
            .await?;

        let issues: Vec<ReviewIssue> = response
            .issues
            .into_iter()
            .map(|wire| {
                let line_number = wire
                    .match_text
                    .as_deref()
                    .and_then(|snippet| linemap::find_line_number(&document.raw_content, snippet));
                ReviewIssue {
                    severity: wire.severity,
                    message: wire.message,
                    match_text: wire.match_text,
                    line_number,
                    suggestion: wire.suggestion,
                }
            })
            .collect();

        let issues = match self.config.severity_level {
            Some(min) => filter_issues_by_severity(&issues, min),
            None => issues,
        };

        Ok(ReviewResult {
            source: document.source.clone(),
            issues,
            summary: response.summary,
            reviewed_at: Utc::now(),
        })
    }
}

impl ContentReviewer<LlmClient> {
    /// Wire up the HTTP gateway for the configured provider.
    ///
    /// Resolves the credential first so a missing key fails before any
    /// network activity.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::MissingApiKey`] when no credential is
    /// available, or [`QuillError::Llm`] if the HTTP client cannot be built.
    pub fn with_llm_client(config: ReviewConfig) -> Result<Self, QuillError> {
        let api_key = resolve_api_key(&config.llm)?;
        let client = LlmClient::new(&config.llm, api_key)?;
        Ok(Self::new(config, client))
    }
}
