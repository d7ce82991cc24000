//! `[[text|description]]` placeholder extraction.
//!
//! A placeholder starts at `[[` and ends at the first `]]`. The body is split
//! on the first `|`:
//!
//! - the text before it cannot contain `|` but may span lines;
//! - the optional description after it ends at the first `]]` and cannot
//!   contain a line break.
//!
//! A `[[` that cannot be closed under these rules is left as literal text.

use std::ops::Range;

/// Description recorded for placeholders written without one.
pub const NO_DESCRIPTION: &str = "(no description provided)";

const OPEN: &str = "[[";
const CLOSE: &str = "]]";
const LINE_BREAKS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// One placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMatch {
    /// Trimmed message text with `{$` already rewritten to `{ $`.
    pub text: String,
    /// Trimmed description, `None` when absent or empty.
    pub description: Option<String>,
    /// The exact substring consumed from the template.
    pub original: String,
    /// Byte range of `original` in the template.
    pub span: Range<usize>,
}

impl PlaceholderMatch {
    /// Description with the default applied.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// Iterate over the placeholders of `template` in source order.
pub fn extract_placeholders(template: &str) -> Placeholders<'_> {
    Placeholders {
        source: template,
        cursor: 0,
    }
}

/// Rewrite every `{$` to `{ $`.
///
/// Closure's `goog.getMsg` treats `{$name}` as a message placeholder, while
/// template text uses it for interpolation. A single pass is enough: the
/// output never contains `{$`, so applying it again changes nothing.
pub fn escape_msg_placeholders(text: &str) -> String {
    text.replace("{$", "{ $")
}

/// Iterator returned by [`extract_placeholders`].
pub struct Placeholders<'a> {
    source: &'a str,
    cursor: usize,
}

enum Marker {
    Found(PlaceholderMatch),
    /// No placeholder starts at this `[[`.
    Skip,
    /// No `]]` follows, so nothing after this point can match.
    Exhausted,
}

impl Iterator for Placeholders<'_> {
    type Item = PlaceholderMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let open = self.cursor + self.source.get(self.cursor..)?.find(OPEN)?;
            match parse_marker(self.source, open) {
                Marker::Found(found) => {
                    self.cursor = found.span.end;
                    return Some(found);
                }
                Marker::Skip => self.cursor = open + 1,
                Marker::Exhausted => {
                    self.cursor = self.source.len();
                    return None;
                }
            }
        }
    }
}

fn parse_marker(source: &str, open: usize) -> Marker {
    let body_start = open + OPEN.len();
    let body = &source[body_start..];

    let Some(close) = body.find(CLOSE) else {
        return Marker::Exhausted;
    };

    let (raw_text, raw_description, body_end) = match body.find('|') {
        Some(pipe) if pipe < close => {
            let description_start = pipe + 1;
            // The first `]]` after the pipe is `close` itself.
            let description = &body[description_start..close];
            if description.contains(LINE_BREAKS) {
                return Marker::Skip;
            }
            (&body[..pipe], Some(description), close)
        }
        _ => (&body[..close], None, close),
    };

    let end = body_start + body_end + CLOSE.len();
    Marker::Found(PlaceholderMatch {
        text: escape_msg_placeholders(raw_text.trim()),
        description: raw_description
            .filter(|d| !d.is_empty())
            .map(|d| d.trim().to_string()),
        original: source[open..end].to_string(),
        span: open..end,
    })
}
