//! Prompt synthesis for the review LLM.
//!
//! Pure functions of language, instruction, and minimum severity. The model
//! is asked to classify issues into the three severity levels and to locate
//! each one with a short verbatim snippet instead of a line number; line
//! numbers are reconciled locally afterwards.

use quill_core::{Language, Severity};

/// Built-in English reviewing rubric, used when no instruction is configured.
pub const DEFAULT_INSTRUCTION_EN: &str = "\
You are a professional editor and proofreader.
Please review the provided text for basic writing issues according to the following criteria:

# Review Criteria

## Grammar & Spelling
- Correct typos and spelling errors.
- Fix grammatical mistakes.

## Clarity & Flow
- Ensure sentences are clear and easy to read.
- Point out ambiguous or confusing phrasing.

## Consistency
- Check for contradictions within the text.
- Ensure consistent terminology and formatting.
";

/// Built-in Japanese reviewing rubric.
pub const DEFAULT_INSTRUCTION_JA: &str = "\
あなたはプロの編集者・校正者です。
提供されたテキストを、以下の基準に従って基本的な文章の問題点についてレビューしてください：

# レビュー基準

## 誤字脱字・文法
- 誤字や脱字を指摘してください。
- 文法的な誤りを修正してください。

## わかりやすさ
- 文章が明確で読みやすいか確認してください。
- 曖昧な表現や分かりにくい言い回しがあれば指摘してください。

## 一貫性・矛盾
- 文中での矛盾点がないか確認してください。
- 用語や表記の揺れ（例：「コンピュータ」と「コンピューター」の混在など）を指摘してください。
";

const OUTPUT_CONTRACT_EN: &str = "\
Provide the review results in English with the following JSON structure:
- issues: Array of found issues
  - severity: Severity level
    - \"error\": Critical issues (Must fix)
    - \"warning\": Important issues (Should fix)
    - \"suggestion\": Minor suggestions (Nice to fix)
  - message: Issue description
  - matchText: Text snippet containing the issue (10-50 characters, extract unique text that can be exactly matched)
  - suggestion: Improvement suggestion (optional)
- summary: Overall assessment (2-3 sentences)

Note:
- Return valid JSON only (do not wrap in markdown code fences or add extra text).
- Do not provide lineNumber. Only provide matchText.
- Provide constructive and specific feedback.
";

const OUTPUT_CONTRACT_JA: &str = "\
レビュー結果は日本語で、以下のJSON構造で返してください：
- issues: 見つかった問題点の配列
  - severity: 深刻度
    - \"error\": 致命的な問題（修正必須）
    - \"warning\": 重要な問題（修正推奨）
    - \"suggestion\": 軽微な改善提案（任意）
  - message: 問題の説明
  - matchText: 問題箇所を含むテキスト片（10-50文字程度。完全一致できる固有のテキストを抜き出してください）
  - suggestion: 改善提案（オプション）
- summary: 全体的な総評（2-3文程度）

注意：
- 有効なJSONのみを返してください（前後に文章やMarkdownのコードブロック等を付けないでください）。
- lineNumberは不要です。matchTextのみを提供してください。
- 建設的で具体的なフィードバックを提供してください。
";

/// Inputs for [`build_system_prompt`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptions<'a> {
    /// Custom reviewing rubric; falls back to the per-language default.
    pub instruction: Option<&'a str>,
    /// Configured minimum severity, if any. Adds the summary-scope clause.
    pub severity_level: Option<Severity>,
}

/// Severity levels at or above `min`, highest first, quoted for prompt text.
fn included_levels(min: Severity) -> String {
    Severity::ALL
        .into_iter()
        .filter(|level| level.meets_threshold(min))
        .map(|level| format!("\"{level}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The summary-scope clause: detection still covers every severity, but the
/// narrative summary must only reference levels the caller will see after
/// filtering.
fn build_summary_instruction(min: Severity, language: Language) -> String {
    let levels = included_levels(min);
    match language {
        Language::Ja => format!(
            "重要: 問題点(issues)は全て適切なseverityで報告してください。\n\
             ただし、総評(summary)は {levels} の問題のみに基づいて記述してください。"
        ),
        Language::En => format!(
            "Important: Report all issues with their appropriate severity levels.\n\
             However, the summary should only reference issues with severity {levels}."
        ),
    }
}

/// Build the system prompt for the given language.
///
/// The prompt is the reviewing rubric (custom or built-in), the optional
/// summary-scope clause, and the JSON output contract.
///
/// # Examples
///
/// ```
/// use quill_core::{Language, Severity};
/// use quill_review::prompt::{build_system_prompt, PromptOptions};
///
/// let prompt = build_system_prompt(Language::En, &PromptOptions::default());
/// assert!(prompt.contains("professional editor"));
/// assert!(prompt.contains("matchText"));
///
/// let scoped = build_system_prompt(
///     Language::En,
///     &PromptOptions {
///         severity_level: Some(Severity::Warning),
///         ..PromptOptions::default()
///     },
/// );
/// assert!(scoped.contains("\"error\", \"warning\""));
/// ```
pub fn build_system_prompt(language: Language, options: &PromptOptions<'_>) -> String {
    let default_instruction = match language {
        Language::En => DEFAULT_INSTRUCTION_EN,
        Language::Ja => DEFAULT_INSTRUCTION_JA,
    };
    let instruction = options
        .instruction
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(default_instruction)
        .trim_end();

    let summary_instruction = match options.severity_level {
        Some(min) => format!("{}\n", build_summary_instruction(min, language)),
        None => String::new(),
    };

    let contract = match language {
        Language::En => OUTPUT_CONTRACT_EN,
        Language::Ja => OUTPUT_CONTRACT_JA,
    };

    format!("{instruction}\n{summary_instruction}\n{contract}")
}

/// Build the user prompt: a short fixed instruction plus the document body
/// verbatim.
///
/// # Examples
///
/// ```
/// use quill_core::Language;
/// use quill_review::prompt::build_user_prompt;
///
/// let prompt = build_user_prompt(Language::En, "Node.js 12 is used.");
/// assert!(prompt.starts_with("Please review the following text:"));
/// assert!(prompt.ends_with("Node.js 12 is used."));
/// ```
pub fn build_user_prompt(language: Language, raw_content: &str) -> String {
    let prefix = match language {
        Language::En => "Please review the following text:\n\n\n",
        Language::Ja => "以下のテキストをレビューしてください：\n\n\n",
    };
    format!("{prefix}{raw_content}")
}
