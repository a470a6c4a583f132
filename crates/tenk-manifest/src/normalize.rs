//! Puppetfile text normalization.
//!
//! Turns raw manifest text into one-statement-per-line canonical form:
//! comments and blank lines are dropped, and a statement whose argument list
//! is still open (trailing comma) is joined with the following physical
//! line. The canonical lines carry their original physical line numbers for
//! diagnostics. No semantic validation happens here.

use serde::Serialize;

/// One fully joined, comment-stripped logical statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalLine {
    /// 1-based physical line number where the statement began.
    pub source_line: usize,
    /// The joined statement text.
    pub text: String,
}

/// The canonical, line-numbered form of a Puppetfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSource {
    pub lines: Vec<CanonicalLine>,
}

impl NormalizedSource {
    /// Render the canonical text, one statement per line.
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Normalize raw Puppetfile text into canonical statements.
///
/// A statement continues onto the next physical line while it ends with a
/// comma: the attribute-list separator has been emitted but the list is not
/// closed. Continuation segments are trimmed before joining, so
/// `mod 'x',\n  :git => 'u'` canonicalizes to `mod 'x',:git => 'u'`.
pub fn normalize_str(input: &str) -> NormalizedSource {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in input.lines().enumerate() {
        let stripped = strip_comment(raw);
        let trimmed = stripped.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (source_line, text) = match pending.take() {
            Some((start, mut joined)) => {
                joined.push_str(trimmed);
                (start, joined)
            }
            None => (idx + 1, trimmed.to_owned()),
        };

        if text.ends_with(',') {
            pending = Some((source_line, text));
        } else {
            lines.push(CanonicalLine { source_line, text });
        }
    }

    // A trailing comma at end of input leaves a dangling statement; emit it
    // verbatim so the tokenizer can report it.
    if let Some((source_line, text)) = pending {
        lines.push(CanonicalLine { source_line, text });
    }

    NormalizedSource { lines }
}

/// Cut a `#` comment, honoring single-quoted strings.
fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    for (pos, c) in line.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..pos],
            _ => {}
        }
    }
    line
}
