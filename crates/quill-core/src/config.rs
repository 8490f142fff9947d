use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuillError;
use crate::types::{Language, Provider, Severity};

/// CLI default placeholder for the severity flag.
///
/// A caller-supplied severity equal to this value means "no filter was
/// requested", not "filter at the lowest level", and resolves to an absent
/// minimum during [`resolve`].
pub const SEVERITY_PLACEHOLDER: &str = "suggestion";

/// Resolved LLM provider settings.
///
/// # Examples
///
/// ```
/// use quill_core::{LlmConfig, Provider};
///
/// let llm = LlmConfig {
///     provider: Provider::OpenAi,
///     model: "gpt-4.1-mini".into(),
///     api_key: None,
/// };
/// assert_eq!(llm.provider, Provider::OpenAi);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Vendor to call.
    pub provider: Provider,
    /// Model identifier, defaulted per provider when not configured.
    pub model: String,
    /// API key; when absent the provider's environment variable is used.
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            provider,
            model: provider.default_model().into(),
            api_key: None,
        }
    }
}

/// Fully-resolved, validated review configuration.
///
/// Built once by [`resolve`] and treated as immutable for the duration of a
/// review. `severity_level: None` means "no minimum, include everything".
///
/// # Examples
///
/// ```
/// use quill_core::{Language, ReviewConfig};
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.language, Language::En);
/// assert!(config.severity_level.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Reviewing rubric sent to the model; built-in default when absent.
    pub instruction: Option<String>,
    /// Language for prompts and feedback.
    pub language: Language,
    /// Provider settings.
    pub llm: LlmConfig,
    /// Minimum severity to keep in the result, if any.
    pub severity_level: Option<Severity>,
}

/// Partial configuration loaded from a `.quill.toml` file.
///
/// All fields are optional strings; they are validated and typed during
/// [`resolve`]. An absent config file is a valid outcome and maps to
/// [`FileConfig::default`].
///
/// # Examples
///
/// ```
/// use quill_core::FileConfig;
///
/// let toml = r#"
/// language = "ja"
///
/// [llm]
/// provider = "anthropic"
/// "#;
/// let config = FileConfig::from_toml(toml).unwrap();
/// assert_eq!(config.language.as_deref(), Some("ja"));
/// assert_eq!(config.llm.provider.as_deref(), Some("anthropic"));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Literal instruction text.
    pub instruction: Option<String>,
    /// Path to an instruction file, relative to the config file's directory.
    /// The loader reads it and folds the contents into `instruction` before
    /// resolution; the contents win over a literal `instruction` value.
    pub instruction_file: Option<String>,
    /// Review language.
    pub language: Option<String>,
    /// Minimum severity level.
    pub severity_level: Option<String>,
    /// Provider settings.
    #[serde(default)]
    pub llm: FileLlmConfig,
}

/// The `[llm]` section of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileLlmConfig {
    /// Provider name (`"openai"`, `"anthropic"`, `"google"`).
    pub provider: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
}

impl FileConfig {
    /// Load a partial configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Io`] if the file cannot be read, or
    /// [`QuillError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, QuillError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a partial configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Toml`] if parsing fails.
    pub fn from_toml(content: &str) -> Result<Self, QuillError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Caller-supplied configuration overrides, typically from CLI flags.
///
/// Every populated field wins over the file config, which in turn wins over
/// the built-in defaults. `instruction` holds literal text; when the caller
/// passes an instruction file the CLI reads it first.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Literal instruction text.
    pub instruction: Option<String>,
    /// Review language.
    pub language: Option<String>,
    /// Provider name.
    pub provider: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Minimum severity level; [`SEVERITY_PLACEHOLDER`] clears the filter.
    pub severity_level: Option<String>,
}

/// Merge defaults, file config, and caller overrides into a validated
/// [`ReviewConfig`].
///
/// Precedence per field: caller > file > default. Validation happens here,
/// before any network call: unknown languages, unknown providers, empty
/// provider/model strings, and unknown severity levels all fail fast.
///
/// # Errors
///
/// Returns [`QuillError::Config`] for invalid field values and
/// [`QuillError::UnsupportedProvider`] for an unrecognized provider name.
///
/// # Examples
///
/// ```
/// use quill_core::{resolve, FileConfig, Language, Overrides, Severity};
///
/// let overrides = Overrides {
///     language: Some("ja".into()),
///     severity_level: Some("warning".into()),
///     ..Overrides::default()
/// };
/// let config = resolve(&FileConfig::default(), &overrides).unwrap();
/// assert_eq!(config.language, Language::Ja);
/// assert_eq!(config.severity_level, Some(Severity::Warning));
/// ```
pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<ReviewConfig, QuillError> {
    let language = match overrides.language.as_deref().or(file.language.as_deref()) {
        None => Language::default(),
        Some(raw) => Language::from_str(raw).map_err(|_| {
            QuillError::Config(format!(
                "invalid language: {raw}. Supported languages are: en, ja"
            ))
        })?,
    };

    let provider = match overrides
        .provider
        .as_deref()
        .or(file.llm.provider.as_deref())
    {
        None => Provider::default(),
        Some("") => return Err(QuillError::Config("LLM provider is required".into())),
        Some(raw) => {
            Provider::from_str(raw).map_err(|_| QuillError::UnsupportedProvider(raw.into()))?
        }
    };

    let model = match overrides.model.as_deref().or(file.llm.model.as_deref()) {
        None => provider.default_model().to_string(),
        Some("") => return Err(QuillError::Config("LLM model is required".into())),
        Some(raw) => raw.to_string(),
    };

    let api_key = overrides
        .api_key
        .clone()
        .or_else(|| file.llm.api_key.clone());

    // The CLI always supplies its default for the severity flag, so a caller
    // value equal to the placeholder means "unset", not "explicitly lowest".
    let caller_severity = overrides
        .severity_level
        .as_deref()
        .filter(|raw| *raw != SEVERITY_PLACEHOLDER);
    let severity_level = match caller_severity.or(file.severity_level.as_deref()) {
        None => None,
        Some(raw) => Some(Severity::from_str(raw).map_err(|_| {
            QuillError::Config(format!(
                "invalid severity level: {raw}. Valid levels are: error, warning, suggestion"
            ))
        })?),
    };

    let instruction = overrides
        .instruction
        .clone()
        .or_else(|| file.instruction.clone());

    Ok(ReviewConfig {
        instruction,
        language,
        llm: LlmConfig {
            provider,
            model,
            api_key,
        },
        severity_level,
    })
}

/// Resolve the API credential using an explicit environment lookup.
///
/// The config key wins when present and non-empty; otherwise the provider's
/// environment variable is consulted through `lookup`. Passing the lookup in
/// keeps the resolver free of ambient state and testable.
///
/// # Errors
///
/// Returns [`QuillError::MissingApiKey`] naming the expected environment
/// variable when no credential is available.
///
/// # Examples
///
/// ```
/// use quill_core::{resolve_api_key_with, LlmConfig, QuillError};
///
/// let llm = LlmConfig::default();
/// let key = resolve_api_key_with(&llm, |var| {
///     (var == "OPENAI_API_KEY").then(|| "sk-test".to_string())
/// })
/// .unwrap();
/// assert_eq!(key, "sk-test");
///
/// let err = resolve_api_key_with(&llm, |_| None).unwrap_err();
/// assert!(matches!(err, QuillError::MissingApiKey(_)));
/// ```
pub fn resolve_api_key_with(
    llm: &LlmConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, QuillError> {
    if let Some(key) = llm.api_key.as_deref() {
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }

    let env_var = llm.provider.api_key_env_var();
    lookup(env_var)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| QuillError::MissingApiKey(env_var.to_string()))
}

/// Resolve the API credential from the process environment.
///
/// Thin wrapper over [`resolve_api_key_with`] for the binary's call site.
///
/// # Errors
///
/// Returns [`QuillError::MissingApiKey`] when neither the config nor the
/// provider's environment variable carries a key.
pub fn resolve_api_key(llm: &LlmConfig) -> Result<String, QuillError> {
    resolve_api_key_with(llm, |var| std::env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_everything_absent() {
        let config = resolve(&FileConfig::default(), &Overrides::default()).unwrap();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.llm.provider, Provider::OpenAi);
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert!(config.llm.api_key.is_none());
        assert!(config.instruction.is_none());
        assert!(config.severity_level.is_none());
    }

    #[test]
    fn valid_explicit_config_passes() {
        let overrides = Overrides {
            language: Some("en".into()),
            provider: Some("openai".into()),
            model: Some("gpt-4.1-mini".into()),
            ..Overrides::default()
        };
        let config = resolve(&FileConfig::default(), &overrides).unwrap();
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert!(config.severity_level.is_none());
    }

    #[test]
    fn caller_wins_over_file() {
        let file = FileConfig {
            language: Some("ja".into()),
            llm: FileLlmConfig {
                provider: Some("google".into()),
                model: Some("gemini-2.5-flash".into()),
                api_key: Some("file-key".into()),
            },
            ..FileConfig::default()
        };
        let overrides = Overrides {
            language: Some("en".into()),
            provider: Some("anthropic".into()),
            api_key: Some("cli-key".into()),
            ..Overrides::default()
        };
        let config = resolve(&file, &overrides).unwrap();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.llm.provider, Provider::Anthropic);
        // Model comes from the file since the caller did not set one.
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.api_key.as_deref(), Some("cli-key"));
    }

    #[test]
    fn model_defaults_per_provider() {
        let overrides = Overrides {
            provider: Some("anthropic".into()),
            ..Overrides::default()
        };
        let config = resolve(&FileConfig::default(), &overrides).unwrap();
        assert_eq!(config.llm.model, "claude-haiku-4-5");
    }

    #[test]
    fn invalid_language_fails() {
        let overrides = Overrides {
            language: Some("xx".into()),
            ..Overrides::default()
        };
        let err = resolve(&FileConfig::default(), &overrides).unwrap_err();
        assert!(err.to_string().contains("invalid language: xx"));
    }

    #[test]
    fn empty_provider_is_required_error() {
        let file = FileConfig {
            llm: FileLlmConfig {
                provider: Some(String::new()),
                ..FileLlmConfig::default()
            },
            ..FileConfig::default()
        };
        let err = resolve(&file, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("LLM provider is required"));
    }

    #[test]
    fn unknown_provider_fails() {
        let overrides = Overrides {
            provider: Some("azure".into()),
            ..Overrides::default()
        };
        let err = resolve(&FileConfig::default(), &overrides).unwrap_err();
        assert!(matches!(err, QuillError::UnsupportedProvider(_)));
        assert!(err.to_string().contains("azure"));
    }

    #[test]
    fn empty_model_fails() {
        let overrides = Overrides {
            model: Some(String::new()),
            ..Overrides::default()
        };
        let err = resolve(&FileConfig::default(), &overrides).unwrap_err();
        assert!(err.to_string().contains("LLM model is required"));
    }

    #[test]
    fn placeholder_severity_resolves_to_none() {
        let overrides = Overrides {
            severity_level: Some(SEVERITY_PLACEHOLDER.into()),
            ..Overrides::default()
        };
        let config = resolve(&FileConfig::default(), &overrides).unwrap();
        assert!(config.severity_level.is_none());
    }

    #[test]
    fn explicit_severity_resolves_to_itself() {
        for (raw, expected) in [("error", Severity::Error), ("warning", Severity::Warning)] {
            let overrides = Overrides {
                severity_level: Some(raw.into()),
                ..Overrides::default()
            };
            let config = resolve(&FileConfig::default(), &overrides).unwrap();
            assert_eq!(config.severity_level, Some(expected));
        }
    }

    #[test]
    fn placeholder_falls_back_to_file_severity() {
        let file = FileConfig {
            severity_level: Some("error".into()),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            severity_level: Some(SEVERITY_PLACEHOLDER.into()),
            ..Overrides::default()
        };
        let config = resolve(&file, &overrides).unwrap();
        assert_eq!(config.severity_level, Some(Severity::Error));
    }

    #[test]
    fn invalid_severity_fails() {
        let file = FileConfig {
            severity_level: Some("fatal".into()),
            ..FileConfig::default()
        };
        let err = resolve(&file, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("invalid severity level: fatal"));
    }

    #[test]
    fn caller_instruction_wins_over_file() {
        let file = FileConfig {
            instruction: Some("file rubric".into()),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            instruction: Some("cli rubric".into()),
            ..Overrides::default()
        };
        let config = resolve(&file, &overrides).unwrap();
        assert_eq!(config.instruction.as_deref(), Some("cli rubric"));
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
instruction = "Be strict about terminology."
language = "ja"
severity_level = "warning"

[llm]
provider = "anthropic"
model = "claude-haiku-4-5"
api_key = "sk-ant-test"
"#;
        let file = FileConfig::from_toml(toml).unwrap();
        let config = resolve(&file, &Overrides::default()).unwrap();
        assert_eq!(config.language, Language::Ja);
        assert_eq!(config.severity_level, Some(Severity::Warning));
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-ant-test"));
        assert_eq!(
            config.instruction.as_deref(),
            Some("Be strict about terminology.")
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let file = FileConfig::from_toml("").unwrap();
        let config = resolve(&file, &Overrides::default()).unwrap();
        assert_eq!(config, ReviewConfig::default());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = FileConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn config_key_wins_over_env() {
        let llm = LlmConfig {
            api_key: Some("config-key".into()),
            ..LlmConfig::default()
        };
        let key = resolve_api_key_with(&llm, |_| Some("env-key".into())).unwrap();
        assert_eq!(key, "config-key");
    }

    #[test]
    fn env_key_used_when_config_empty() {
        let llm = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        let key = resolve_api_key_with(&llm, |var| {
            assert_eq!(var, "OPENAI_API_KEY");
            Some("env-key".into())
        })
        .unwrap();
        assert_eq!(key, "env-key");
    }

    #[test]
    fn missing_key_names_provider_env_var() {
        let llm = LlmConfig {
            provider: Provider::Google,
            model: "gemini-2.5-flash".into(),
            api_key: None,
        };
        let err = resolve_api_key_with(&llm, |_| None).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_GENERATIVE_AI_API_KEY"));
    }
}
