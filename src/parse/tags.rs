use std::ops::Range;

use indexmap::IndexSet;

use crate::model::config::ParserConfig;
use crate::model::task::Field;
use crate::parse::span::{protected_spans, strip_spans};
use crate::parse::{Limit, ParseError};
use crate::util::unicode::{
    char_at, char_before, grapheme_len, is_escaped, is_tag_char, is_word_char, truncate_graphemes,
};

/// Tags and `@contexts` found in one task's text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagScan {
    /// `#`-prefixed, deduplicated, first-seen order
    pub tags: IndexSet<String>,
    /// Fields derived from namespaced tags and `@context` tokens, in the
    /// order they appeared
    pub fields: Vec<(Field, String)>,
    pub removed: Vec<Range<usize>>,
    pub limit_hit: Option<ParseError>,
}

impl TagScan {
    /// `text` with every tag and context token removed
    pub fn strip(&self, text: &str) -> String {
        strip_spans(text, &self.removed)
    }
}

#[derive(Debug, Clone)]
pub struct TagScanner {
    prefixes: Vec<(String, Field)>,
    max_tag_length: usize,
    max_iterations: usize,
}

impl TagScanner {
    pub fn new(config: &ParserConfig) -> Self {
        TagScanner {
            prefixes: config
                .special_tag_prefixes
                .iter()
                .map(|(prefix, field)| (prefix.to_lowercase(), Field::from_name(field)))
                .collect(),
            max_tag_length: config.max_tag_length,
            max_iterations: config.max_metadata_iterations,
        }
    }

    pub fn scan(&self, text: &str) -> TagScan {
        self.scan_region(text, &[], text.len(), 0)
    }

    /// Scan `text[..end]`, ignoring `skip` ranges (already consumed
    /// markers) as well as links, code spans and URLs.
    pub fn scan_region(&self, text: &str, skip: &[Range<usize>], end: usize, line: usize) -> TagScan {
        let mut blocked = protected_spans(text);
        blocked.extend(skip.iter().cloned());

        let mut out = TagScan::default();
        let mut iterations = 0;
        let mut i = 0;

        while i < end {
            if let Some(span) = blocked.iter().find(|r| r.contains(&i)) {
                i = span.end;
                continue;
            }
            let Some(c) = char_at(text, i) else { break };
            let token = match c {
                '#' if token_can_start(text, i) => tag_body(text, i + 1, end).map(|b| (b, true)),
                '@' if token_can_start(text, i) => context_body(text, i + 1, end).map(|b| (b, false)),
                _ => None,
            };
            let Some((body, is_tag)) = token else {
                i += c.len_utf8();
                continue;
            };

            iterations += 1;
            if iterations > self.max_iterations {
                out.limit_hit = Some(ParseError::LimitExceeded {
                    limit: Limit::MetadataIterations,
                    max: self.max_iterations,
                    line,
                });
                break;
            }

            let token_end = i + 1 + body.len();
            if is_tag {
                out.tags.insert(self.bounded(&format!("#{}", body)));
                if let Some(field) = self.namespace_field(body) {
                    out.fields.push(field);
                }
            } else {
                out.fields.push((Field::Context, body.to_string()));
            }
            out.removed.push(i..token_end);
            i = token_end;
        }

        out
    }

    /// `project/foo/bar` -> (project field, `foo/bar`) when the first
    /// segment is a configured namespace. Leading `#` is ignored.
    pub fn namespace_field(&self, tag: &str) -> Option<(Field, String)> {
        let body = tag.trim().trim_start_matches('#');
        let (prefix, rest) = body.split_once('/')?;
        if rest.is_empty() {
            return None;
        }
        let prefix = prefix.to_lowercase();
        self.prefixes
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, field)| (field.clone(), rest.to_string()))
    }

    fn bounded(&self, tag: &str) -> String {
        if grapheme_len(tag) > self.max_tag_length {
            tracing::debug!(tag, max = self.max_tag_length, "truncating long tag");
            truncate_graphemes(tag, self.max_tag_length).to_string()
        } else {
            tag.to_string()
        }
    }
}

/// `#` / `@` start a token only at a word start: not escaped, and not
/// glued to a preceding letter, digit or one of `#@$%^&`.
fn token_can_start(text: &str, i: usize) -> bool {
    if is_escaped(text, i) {
        return false;
    }
    match char_before(text, i) {
        None => true,
        Some(c) if c.is_whitespace() => true,
        Some(c) => !(c.is_ascii_alphanumeric() || "#@$%^&".contains(c)),
    }
}

/// Tag body after `#`: word characters and `/` separators. Trailing
/// separators and purely numeric bodies (`#3`) don't count.
fn tag_body(text: &str, start: usize, end: usize) -> Option<&str> {
    if !char_at(text, start).is_some_and(is_word_char) {
        return None;
    }
    let len = text[start..end]
        .find(|c: char| !is_tag_char(c))
        .unwrap_or(end - start);
    let body = text[start..start + len].trim_end_matches('/');
    if body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(body)
}

fn context_body(text: &str, start: usize, end: usize) -> Option<&str> {
    let len = text[start..end]
        .find(|c: char| !is_word_char(c))
        .unwrap_or(end - start);
    (len > 0).then(|| &text[start..start + len])
}
