//! Reconciles a model-reported text snippet with the original document.

/// Find the 1-based line number of `match_text` within `document_text`.
///
/// Tries an exact substring search first; the line number is the count of
/// newlines before the match start plus one. If the snippet is not found
/// verbatim (models sometimes paraphrase whitespace), falls back to scanning
/// line by line for the trimmed snippet. Returns `None` when neither
/// strategy matches. The first (lowest) match wins in both modes, so a
/// repeated snippet maps deterministically.
///
/// # Examples
///
/// ```
/// use quill_review::linemap::find_line_number;
///
/// let doc = "# Title\n\nNode.js 12 is used.\n";
/// assert_eq!(find_line_number(doc, "Node.js 12"), Some(3));
/// assert_eq!(find_line_number(doc, "not in the document"), None);
/// ```
pub fn find_line_number(document_text: &str, match_text: &str) -> Option<usize> {
    if let Some(index) = document_text.find(match_text) {
        let line_number = document_text[..index].matches('\n').count() + 1;
        return Some(line_number);
    }

    let trimmed = match_text.trim();
    document_text
        .lines()
        .position(|line| line.contains(trimmed))
        .map(|i| i + 1)
}
