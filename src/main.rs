use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};

use quill_core::{
    resolve, Document, FileConfig, Language, Overrides, ReviewConfig, ReviewIssue, ReviewResult,
    Severity, SEVERITY_PLACEHOLDER,
};
use quill_review::pipeline::ContentReviewer;
use quill_review::prompt::{DEFAULT_INSTRUCTION_EN, DEFAULT_INSTRUCTION_JA};

#[derive(Parser)]
#[command(
    name = "quill",
    version,
    about = "AI content reviewer — LLM-powered proofreading for your docs",
    long_about = "Quill reviews a text document with an LLM and reports writing issues\n\
                  (errors, warnings, suggestions) mapped back to source line numbers.\n\n\
                  Examples:\n  \
                    quill README.md                      Review with defaults (OpenAI, English)\n  \
                    quill draft.md -l ja                 Review in Japanese\n  \
                    quill article.md -s warning          Only report warnings and errors\n  \
                    quill notes.md --provider anthropic  Use a different provider\n  \
                    quill post.md --json -o result.json  Machine-readable output"
)]
struct Cli {
    /// File to review
    file: PathBuf,

    /// Path to review configuration file (default: .quill.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a review instruction file
    #[arg(short, long)]
    instruction: Option<PathBuf>,

    /// Write the review result to this path (JSON format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Review language: en, ja (default: en)
    #[arg(short, long)]
    language: Option<String>,

    /// Minimum severity to report: error, warning, suggestion
    #[arg(short, long, default_value = SEVERITY_PLACEHOLDER)]
    severity_level: String,

    /// LLM provider: openai, anthropic, google (default: openai)
    #[arg(long)]
    provider: Option<String>,

    /// LLM model (defaults per provider)
    #[arg(long)]
    model: Option<String>,

    /// LLM provider API key (falls back to the provider's env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Output the review result as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Display configuration and instructions without running a review
    #[arg(long)]
    dry_run: bool,
}

/// Load the partial file config and the directory instruction paths resolve
/// against. A missing default config file is a valid outcome.
fn load_file_config(explicit: Option<&Path>) -> Result<(FileConfig, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = FileConfig::from_file(path).into_diagnostic()?;
            let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            Ok((config, dir))
        }
        None => {
            let default_path = Path::new(".quill.toml");
            if default_path.exists() {
                let config = FileConfig::from_file(default_path).into_diagnostic()?;
                Ok((config, PathBuf::from(".")))
            } else {
                Ok((FileConfig::default(), PathBuf::from(".")))
            }
        }
    }
}

/// Fold instruction files into instruction text. A caller-supplied file
/// becomes the override; otherwise the config's `instruction_file` (relative
/// to the config directory) replaces a literal `instruction` value. Read
/// failures warn and fall through rather than aborting the review.
fn load_instruction_override(
    cli_instruction: Option<&Path>,
    file_config: &mut FileConfig,
    config_dir: &Path,
) -> Option<String> {
    if let Some(path) = cli_instruction {
        match std::fs::read_to_string(path) {
            Ok(text) => return Some(text),
            Err(e) => {
                eprintln!(
                    "warning: failed to load instruction file {}: {e}",
                    path.display()
                );
            }
        }
    }

    if let Some(rel) = file_config.instruction_file.take() {
        let path = config_dir.join(rel);
        match std::fs::read_to_string(&path) {
            Ok(text) => file_config.instruction = Some(text),
            Err(e) => {
                eprintln!(
                    "warning: failed to load instruction file {}: {e}",
                    path.display()
                );
            }
        }
    }

    None
}

fn print_dry_run(config: &ReviewConfig, file: &Path) {
    println!("Dry Run: Configuration Preview");
    println!("Target File: {}", file.display());
    println!("Model: {} ({})", config.llm.model, config.llm.provider);
    println!("Language: {}", config.language);
    match config.severity_level {
        Some(level) => println!("Minimum severity: {level}"),
        None => println!("Minimum severity: none (all issues reported)"),
    }
    println!("\n[Applied Instructions]");
    match &config.instruction {
        Some(instruction) => println!("{instruction}"),
        None => {
            let default_instruction = match config.language {
                Language::Ja => DEFAULT_INSTRUCTION_JA,
                Language::En => DEFAULT_INSTRUCTION_EN,
            };
            println!("{default_instruction}");
            println!("(Note: These are the default instructions for the selected language)");
        }
    }
    println!("End of Preview");
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\u{2717}",
        Severity::Warning => "\u{26a0}",
        Severity::Suggestion => "\u{1f4a1}",
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31m",
        Severity::Warning => "\x1b[33m",
        Severity::Suggestion => "\x1b[36m",
    }
}

fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{code}{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn format_issue(issue: &ReviewIssue, index: usize, use_color: bool) -> String {
    let mut out = String::new();
    let label = format!(
        "{} {}",
        severity_icon(issue.severity),
        issue.severity.to_string().to_uppercase()
    );

    out.push_str(&paint(&format!("{index}."), "\x1b[1m", use_color));
    out.push(' ');
    out.push_str(&paint(&label, severity_color(issue.severity), use_color));
    out.push('\n');

    match issue.line_number {
        Some(line) => {
            out.push_str("   ");
            out.push_str(&paint(&format!("Line {line}:"), "\x1b[90m", use_color));
            out.push(' ');
        }
        None => out.push_str("   "),
    }
    out.push_str(&issue.message);
    out.push('\n');

    if let Some(snippet) = &issue.match_text {
        out.push_str("   ");
        out.push_str(&paint(
            &format!("Snippet: \"{snippet}\""),
            "\x1b[90m",
            use_color,
        ));
        out.push('\n');
    }

    if let Some(suggestion) = &issue.suggestion {
        out.push_str("   ");
        out.push_str(&paint("\u{1f4a1} Suggestion:", "\x1b[36m", use_color));
        out.push(' ');
        out.push_str(suggestion);
        out.push('\n');
    }

    out.push('\n');
    out
}

fn format_review_result(result: &ReviewResult, use_color: bool) -> String {
    let mut out = String::new();
    out.push_str(&paint(
        &format!("Review Result: {}", result.source),
        "\x1b[1m",
        use_color,
    ));
    out.push_str("\n\n");

    if result.issues.is_empty() {
        out.push_str(&paint("\u{2713} No issues found!", "\x1b[32m", use_color));
        out.push('\n');
    } else {
        out.push_str(&paint(
            &format!("Issues ({}):", result.issues.len()),
            "\x1b[1m",
            use_color,
        ));
        out.push_str("\n\n");
        for (i, issue) in result.issues.iter().enumerate() {
            out.push_str(&format_issue(issue, i + 1, use_color));
        }
    }

    out.push_str(&paint("Summary:", "\x1b[1m", use_color));
    out.push(' ');
    out.push_str(&result.summary);
    out.push('\n');
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let use_color = std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err();

    let (mut file_config, config_dir) = load_file_config(cli.config.as_deref())?;
    let instruction =
        load_instruction_override(cli.instruction.as_deref(), &mut file_config, &config_dir);

    let overrides = Overrides {
        instruction,
        language: cli.language.clone(),
        provider: cli.provider.clone(),
        model: cli.model.clone(),
        api_key: cli.api_key.clone(),
        severity_level: Some(cli.severity_level.clone()),
    };
    let config = resolve(&file_config, &overrides).into_diagnostic()?;

    if cli.dry_run {
        print_dry_run(&config, &cli.file);
        return Ok(());
    }

    let document = Document::from_file(&cli.file).into_diagnostic()?;

    // Fails fast on a missing credential, before any network call.
    let reviewer = ContentReviewer::with_llm_client(config).into_diagnostic()?;

    let spinner = ProgressBar::new_spinner();
    spinner
        .set_style(ProgressStyle::with_template("{spinner} {msg}").expect("valid spinner template"));
    spinner.set_message("Reviewing content (this may take a moment)...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let outcome = reviewer.review(&document).await;
    spinner.finish_and_clear();
    let result = outcome.into_diagnostic()?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).into_diagnostic()?
        );
    } else {
        print!("{}", format_review_result(&result, use_color));
    }

    if let Some(output_path) = &cli.output {
        let json = serde_json::to_string_pretty(&result).into_diagnostic()?;
        std::fs::write(output_path, json).into_diagnostic()?;
        eprintln!("Results saved to: {}", output_path.display());
    }

    let has_errors = result
        .issues
        .iter()
        .any(|issue| issue.severity == Severity::Error);
    if has_errors {
        std::process::exit(1);
    }
    Ok(())
}
