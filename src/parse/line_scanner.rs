use crate::model::config::ParserConfig;
use crate::parse::{Limit, ParseError};

/// What a scanned line turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `- [x] body`
    Task {
        marker: &'a str,
        status: char,
        body: &'a str,
    },
    /// `## text` (only when headings are parsed)
    Heading { level: u8, text: &'a str },
    /// Any other non-blank line outside a code fence
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// The full line, without its line ending
    pub text: &'a str,
    /// 0-based
    pub line_number: usize,
    /// Leading whitespace width, clamped per nesting step
    pub indent: usize,
    pub kind: LineKind<'a>,
}

/// Split `content` into classified lines.
///
/// Blank lines and everything inside fenced code blocks are dropped.
/// Malformed checkboxes come back as plain text; the only error is
/// running past `max_parse_iterations` lines.
pub fn scan<'a>(content: &'a str, config: &ParserConfig) -> Result<Vec<RawLine<'a>>, ParseError> {
    let mut out = Vec::new();
    let mut in_fence = false;
    let mut clamp = IndentClamp::new(config.max_indent_size);

    // `lines()` strips both `\n` and `\r\n`
    for (line_number, text) in content.lines().enumerate() {
        if line_number >= config.max_parse_iterations {
            return Err(ParseError::LimitExceeded {
                limit: Limit::ParseIterations,
                max: config.max_parse_iterations,
                line: line_number,
            });
        }

        let trimmed = text.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || trimmed.is_empty() {
            continue;
        }

        let raw_indent = text.len() - trimmed.len();

        if let Some((marker, status, body)) = parse_checkbox(trimmed) {
            out.push(RawLine {
                text,
                line_number,
                indent: clamp.apply(raw_indent),
                kind: LineKind::Task {
                    marker,
                    status,
                    body,
                },
            });
            continue;
        }

        if looks_like_checkbox(trimmed) {
            tracing::debug!(line = line_number, "skipping malformed checkbox");
        }

        let kind = match heading(trimmed) {
            Some((level, text)) if config.parse_headings && raw_indent < 4 => {
                LineKind::Heading { level, text }
            }
            _ => LineKind::Text,
        };
        out.push(RawLine {
            text,
            line_number,
            indent: raw_indent,
            kind,
        });
    }

    Ok(out)
}

/// Recognize `<marker> [<status>] <body>` on an unindented line
fn parse_checkbox(line: &str) -> Option<(&str, char, &str)> {
    let marker_len = list_marker_len(line)?;
    let after_marker = &line[marker_len..];
    let box_part = after_marker.trim_start_matches([' ', '\t']);
    if box_part.len() == after_marker.len() {
        return None;
    }

    let mut chars = box_part.char_indices();
    if chars.next()?.1 != '[' {
        return None;
    }
    let (_, status) = chars.next()?;
    if status == ']' || status == '[' {
        return None;
    }
    let (close_idx, close) = chars.next()?;
    if close != ']' {
        return None;
    }

    let body = &box_part[close_idx + 1..];
    if !body.is_empty() && !body.starts_with([' ', '\t']) {
        return None;
    }
    Some((&line[..marker_len], status, body.trim()))
}

/// `-`, `*`, `+`, `1.` or `1)`
fn list_marker_len(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    match bytes.first()? {
        b'-' | b'*' | b'+' => Some(1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.') | Some(b')') => Some(digits + 1),
                _ => None,
            }
        }
        _ => None,
    }
}

fn looks_like_checkbox(line: &str) -> bool {
    list_marker_len(line)
        .map(|n| line[n..].trim_start().starts_with('['))
        .unwrap_or(false)
}

/// ATX heading: 1-6 `#` followed by whitespace and some text
fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    if text.is_empty() {
        return None;
    }
    Some((level as u8, text))
}

/// Clamps each nesting step to at most `max_step` columns while keeping
/// the relative order of indentation levels intact.
struct IndentClamp {
    max_step: usize,
    /// (raw, clamped) for the currently open levels
    levels: Vec<(usize, usize)>,
}

impl IndentClamp {
    fn new(max_step: usize) -> Self {
        IndentClamp {
            max_step,
            levels: Vec::new(),
        }
    }

    fn step(&self, width: usize) -> usize {
        if self.max_step == 0 {
            width
        } else {
            width.min(self.max_step)
        }
    }

    fn apply(&mut self, raw: usize) -> usize {
        while self.levels.last().is_some_and(|&(r, _)| r > raw) {
            self.levels.pop();
        }
        let clamped = match self.levels.last() {
            Some(&(r, c)) if r == raw => return c,
            Some(&(r, c)) => c + self.step(raw - r),
            None => self.step(raw),
        };
        self.levels.push((raw, clamped));
        clamped
    }
}
