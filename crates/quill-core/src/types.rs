use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuillError;

/// Severity of a review issue.
///
/// Totally ordered: error > warning > suggestion. The numeric order lives in
/// [`Severity::weight`] and everything else (threshold checks, the default
/// include-everything level) derives from it.
///
/// # Examples
///
/// ```
/// use quill_core::Severity;
///
/// let s: Severity = serde_json::from_str("\"error\"").unwrap();
/// assert_eq!(s, Severity::Error);
/// assert!(s.meets_threshold(Severity::Warning));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical issue that must be fixed.
    Error,
    /// Important issue that should be fixed.
    Warning,
    /// Minor improvement that is nice to fix.
    Suggestion,
}

impl Severity {
    /// All severity levels, highest first.
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Suggestion];

    /// Numeric weight of this level. Higher means more severe.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_core::Severity;
    ///
    /// assert!(Severity::Error.weight() > Severity::Warning.weight());
    /// assert!(Severity::Warning.weight() > Severity::Suggestion.weight());
    /// ```
    pub fn weight(self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Suggestion => 1,
        }
    }

    /// Returns `true` if `self` is at least as severe as `threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_core::Severity;
    ///
    /// assert!(Severity::Error.meets_threshold(Severity::Warning));
    /// assert!(Severity::Warning.meets_threshold(Severity::Warning));
    /// assert!(!Severity::Suggestion.meets_threshold(Severity::Warning));
    /// ```
    pub fn meets_threshold(self, threshold: Severity) -> bool {
        self.weight() >= threshold.weight()
    }

    /// The lowest-weighted level, i.e. the "include everything" threshold.
    ///
    /// Computed from [`Severity::ALL`] and [`Severity::weight`] rather than
    /// hard-coded, so the ordering stays the single source of truth.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_core::Severity;
    ///
    /// assert_eq!(Severity::lowest(), Severity::Suggestion);
    /// ```
    pub fn lowest() -> Severity {
        Severity::ALL
            .into_iter()
            .min_by_key(|s| s.weight())
            .expect("Severity::ALL is non-empty")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Suggestion => write!(f, "suggestion"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "suggestion" => Ok(Severity::Suggestion),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Language used for the review prompts and feedback.
///
/// # Examples
///
/// ```
/// use quill_core::Language;
///
/// let lang: Language = "ja".parse().unwrap();
/// assert_eq!(lang, Language::Ja);
/// assert!("xx".parse::<Language>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Japanese.
    Ja,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ja => write!(f, "ja"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ja" => Ok(Language::Ja),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// An LLM vendor selectable per configuration.
///
/// # Examples
///
/// ```
/// use quill_core::Provider;
///
/// let p: Provider = "anthropic".parse().unwrap();
/// assert_eq!(p.default_model(), "claude-haiku-4-5");
/// assert_eq!(p.api_key_env_var(), "ANTHROPIC_API_KEY");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions API.
    #[default]
    OpenAi,
    /// Anthropic messages API.
    Anthropic,
    /// Google Gemini generateContent API.
    Google,
}

impl Provider {
    /// Model used when the configuration does not name one.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4.1-mini",
            Provider::Anthropic => "claude-haiku-4-5",
            Provider::Google => "gemini-2.5-flash",
        }
    }

    /// Environment variable consulted when the configuration carries no key.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Google => write!(f, "google"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google" => Ok(Provider::Google),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// A text document under review.
///
/// Immutable once constructed; the pipeline never mutates the content.
///
/// # Examples
///
/// ```
/// use quill_core::Document;
///
/// let doc = Document::new("# Title\n\nBody.", "README.md");
/// assert_eq!(doc.source, "README.md");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// Full text content as read from the source.
    pub raw_content: String,
    /// Identifier for where the content came from, usually a file path.
    pub source: String,
}

impl Document {
    /// Create a document from in-memory content.
    pub fn new(raw_content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
            source: source.into(),
        }
    }

    /// Read a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::DocumentRead`] naming the path if the file
    /// cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quill_core::Document;
    /// use std::path::Path;
    ///
    /// let doc = Document::from_file(Path::new("notes.md")).unwrap();
    /// assert_eq!(doc.source, "notes.md");
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, QuillError> {
        let raw_content =
            std::fs::read_to_string(path).map_err(|source| QuillError::DocumentRead {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            raw_content,
            source: path.display().to_string(),
        })
    }
}

/// A single issue reported by the reviewer.
///
/// `match_text` comes from the model; `line_number` is derived locally by
/// matching it against the document and is never model-supplied.
///
/// # Examples
///
/// ```
/// use quill_core::{ReviewIssue, Severity};
///
/// let issue = ReviewIssue {
///     severity: Severity::Warning,
///     message: "Outdated runtime version".into(),
///     match_text: Some("Node.js 12".into()),
///     line_number: Some(3),
///     suggestion: Some("Upgrade to an LTS release".into()),
/// };
/// let json = serde_json::to_value(&issue).unwrap();
/// assert_eq!(json["matchText"], "Node.js 12");
/// assert_eq!(json["lineNumber"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewIssue {
    /// Severity of the finding.
    pub severity: Severity,
    /// Explanation of the issue.
    pub message: String,
    /// Short verbatim excerpt locating the issue in the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_text: Option<String>,
    /// 1-based line number derived from `match_text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Result of a completed content review.
///
/// Issues keep the order the model produced them in (after severity
/// filtering); they are never re-sorted. Serializes with stable key order
/// for golden-file comparisons.
///
/// # Examples
///
/// ```
/// use quill_core::ReviewResult;
/// use chrono::Utc;
///
/// let result = ReviewResult {
///     source: "doc.md".into(),
///     issues: vec![],
///     summary: "Looks good.".into(),
///     reviewed_at: Utc::now(),
/// };
/// let json = serde_json::to_value(&result).unwrap();
/// assert_eq!(json["summary"], "Looks good.");
/// assert!(json.get("reviewedAt").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// Identifier of the reviewed document.
    pub source: String,
    /// Surviving issues, in the order the model reported them.
    pub issues: Vec<ReviewIssue>,
    /// Overall assessment from the model.
    pub summary: String,
    /// When the review completed, UTC.
    pub reviewed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_total_order() {
        assert!(Severity::Error.weight() > Severity::Warning.weight());
        assert!(Severity::Warning.weight() > Severity::Suggestion.weight());
    }

    #[test]
    fn severity_lowest_is_suggestion() {
        assert_eq!(Severity::lowest(), Severity::Suggestion);
    }

    #[test]
    fn severity_meets_threshold() {
        assert!(Severity::Error.meets_threshold(Severity::Error));
        assert!(Severity::Error.meets_threshold(Severity::Suggestion));
        assert!(Severity::Suggestion.meets_threshold(Severity::Suggestion));
        assert!(!Severity::Suggestion.meets_threshold(Severity::Error));
        assert!(!Severity::Warning.meets_threshold(Severity::Error));
    }

    #[test]
    fn severity_roundtrips_through_json() {
        let json = serde_json::to_string(&Severity::Error).unwrap();
        assert_eq!(json, "\"error\"");

        let parsed: Severity = serde_json::from_str("\"suggestion\"").unwrap();
        assert_eq!(parsed, Severity::Suggestion);
    }

    #[test]
    fn severity_from_str() {
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("Warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(
            "SUGGESTION".parse::<Severity>().unwrap(),
            Severity::Suggestion
        );
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn language_from_str() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("JA".parse::<Language>().unwrap(), Language::Ja);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn provider_defaults() {
        assert_eq!(Provider::OpenAi.default_model(), "gpt-4.1-mini");
        assert_eq!(Provider::Anthropic.default_model(), "claude-haiku-4-5");
        assert_eq!(Provider::Google.default_model(), "gemini-2.5-flash");
        assert_eq!(Provider::OpenAi.api_key_env_var(), "OPENAI_API_KEY");
        assert_eq!(
            Provider::Google.api_key_env_var(),
            "GOOGLE_GENERATIVE_AI_API_KEY"
        );
    }

    #[test]
    fn provider_from_str() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("Google".parse::<Provider>().unwrap(), Provider::Google);
        assert!("azure".parse::<Provider>().is_err());
    }

    #[test]
    fn document_from_missing_file_names_path() {
        let err = Document::from_file(Path::new("/nonexistent/quill-doc.md")).unwrap_err();
        assert!(matches!(err, QuillError::DocumentRead { .. }));
        assert!(err.to_string().contains("/nonexistent/quill-doc.md"));
    }

    #[test]
    fn issue_serializes_camel_case_and_skips_absent_fields() {
        let issue = ReviewIssue {
            severity: Severity::Error,
            message: "typo".into(),
            match_text: None,
            line_number: None,
            suggestion: None,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "error");
        assert!(json.get("matchText").is_none());
        assert!(json.get("lineNumber").is_none());
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn result_serializes_iso8601_timestamp() {
        let result = ReviewResult {
            source: "doc.md".into(),
            issues: vec![],
            summary: "ok".into(),
            reviewed_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["reviewedAt"], "2024-05-01T12:00:00Z");
    }
}
