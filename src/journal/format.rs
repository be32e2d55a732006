//! Normalization of edited entries before they are sealed again.

use crate::errors::{AppResult, FormatError};

/// Re-renders edited plaintext into its canonical stored form.
pub trait EntryFormatter {
    /// Formats `text`. On error the caller keeps the journal untouched.
    fn format(&self, text: &[u8]) -> AppResult<String>;
}

/// Conservative Markdown normalizer.
///
/// Rules, applied outside code blocks:
///
/// - line endings become `\n`
/// - trailing whitespace is removed, except that a hard line break (two or
///   more trailing spaces) is kept as exactly two spaces
/// - ATX headings get exactly one space after the hashes (`###  x` → `### x`)
/// - `*` and `+` bullet markers become `-`
/// - runs of blank lines collapse to one, trailing blank lines are dropped
///
/// Fenced code (```` ``` ```` or `~~~`) and indented code (four spaces or a tab
/// after a blank line, outside a list) are copied verbatim. Non-empty output
/// always ends with exactly one newline.
///
/// # Examples
///
/// ```
/// use jrnl::journal::{EntryFormatter, MarkdownFormatter};
///
/// let formatted = MarkdownFormatter.format(b"\n###   10-19-2026 09:30:00 Mon  \r\nhello\n\n\n").unwrap();
/// assert_eq!(formatted, "\n### 10-19-2026 09:30:00 Mon\nhello\n");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownFormatter;

impl EntryFormatter for MarkdownFormatter {
    fn format(&self, text: &[u8]) -> AppResult<String> {
        let text = std::str::from_utf8(text).map_err(|e| FormatError::InvalidUtf8 {
            offset: e.valid_up_to(),
        })?;
        Ok(format_markdown(text))
    }
}

fn format_markdown(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    let mut fence: Option<&str> = None;
    let mut indented_code = false;
    let mut in_list = false;

    for line in text.split('\n') {
        if let Some(marker) = fence {
            if line.trim_start().starts_with(marker) {
                fence = None;
                lines.push(line.trim_end().to_string());
            } else {
                lines.push(line.to_string());
            }
            continue;
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            if indented_code || !lines.last().is_some_and(|l| l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }

        let after_blank = lines.last().map_or(true, |l| l.is_empty());
        if is_indented(line) && (indented_code || (after_blank && !in_list)) {
            indented_code = true;
            lines.push(line.to_string());
            continue;
        }
        indented_code = false;

        if let Some(marker) = fence_marker(trimmed) {
            fence = Some(marker);
            lines.push(trimmed.to_string());
            continue;
        }

        in_list = is_list_item(trimmed) || (in_list && is_indented(line));

        lines.push(match normalize_heading(trimmed) {
            Some(heading) => heading,
            // Hard line break.
            None if line.ends_with("  ") => format!("{}  ", normalize_bullet(trimmed)),
            None => normalize_bullet(trimmed),
        });
    }

    // An unterminated fence keeps its trailing lines as typed.
    if fence.is_none() {
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
    }

    if lines.is_empty() {
        return String::new();
    }

    let mut out = lines.join("\n");
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let start = line.trim_start();
    if start.starts_with("```") {
        Some("```")
    } else if start.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

fn is_list_item(line: &str) -> bool {
    let body = line.trim_start();
    if ["- ", "* ", "+ "].iter().any(|m| body.starts_with(m)) {
        return true;
    }
    let digits = body.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && (body[digits..].starts_with(". ") || body[digits..].starts_with(") "))
}

/// `Some` with the canonical form when `line` is an ATX heading.
fn normalize_heading(line: &str) -> Option<String> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }

    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some(line.to_string());
    }
    if !rest.starts_with(char::is_whitespace) {
        // `#tag` is not a heading.
        return None;
    }

    Some(format!("{} {}", &line[..hashes], rest.trim_start()))
}

fn normalize_bullet(line: &str) -> String {
    let indent = line.len() - line.trim_start().len();
    let body = &line[indent..];

    // Thematic breaks such as `* * *` stay as they are.
    if body.chars().all(|c| c == '*' || c == ' ') {
        return line.to_string();
    }

    match body.strip_prefix("* ").or_else(|| body.strip_prefix("+ ")) {
        Some(item) => format!("{}- {}", &line[..indent], item),
        None => line.to_string(),
    }
}
