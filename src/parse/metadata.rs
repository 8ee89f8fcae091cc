use std::ops::Range;

use crate::model::config::ParserConfig;
use crate::model::task::{Field, Priority, TaskMetadata, priority_level};
use crate::parse::span::{protected_spans, strip_spans};
use crate::parse::{Limit, ParseError};
use crate::util::unicode::{char_at, char_before, char_prefix_len, is_word_char};

const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Filename extensions that end a marker value when followed by
/// whitespace, optionally with a `#heading` fragment in between
const FILE_EXTENSIONS: [&str; 4] = [".md", ".canvas", ".txt", ".pdf"];

/// Emoji markers from the config, longest first so that multi-codepoint
/// markers win over their prefixes.
#[derive(Debug, Clone)]
pub struct MarkerTable {
    markers: Vec<(String, Field)>,
}

impl MarkerTable {
    pub fn new(config: &ParserConfig) -> Self {
        let mut markers: Vec<(String, Field)> = config
            .emoji_mapping
            .iter()
            .filter(|(emoji, _)| !emoji.is_empty())
            .map(|(emoji, field)| (emoji.clone(), Field::from_name(field)))
            .collect();
        markers.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        MarkerTable { markers }
    }

    /// Marker at the start of `rest`: (bytes consumed, emoji, field)
    pub fn match_at(&self, rest: &str) -> Option<(usize, &str, &Field)> {
        let (emoji, field) = self.markers.iter().find(|(e, _)| rest.starts_with(e.as_str()))?;
        let mut len = emoji.len();
        if rest[len..].starts_with(VARIATION_SELECTOR) {
            len += VARIATION_SELECTOR.len_utf8();
        }
        Some((len, emoji.as_str(), field))
    }
}

/// Result of pulling emoji and dataview markers out of one task's text
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Text with every consumed marker removed
    pub content: String,
    pub metadata: TaskMetadata,
    /// Byte ranges of the input that were consumed
    pub removed: Vec<Range<usize>>,
    /// Byte offset where extraction stopped; the input length unless a
    /// limit was hit
    pub stopped_at: usize,
    pub limit_hit: Option<ParseError>,
}

/// Pulls emoji-keyed and `[key:: value]` markers out of task text
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    markers: MarkerTable,
    emoji: bool,
    dataview: bool,
    special_tag_prefixes: Vec<(String, Field)>,
    max_iterations: usize,
    max_value_len: usize,
}

impl MetadataExtractor {
    pub fn new(config: &ParserConfig) -> Self {
        MetadataExtractor {
            markers: MarkerTable::new(config),
            emoji: config.metadata_parse_mode.emoji(),
            dataview: config.metadata_parse_mode.dataview(),
            special_tag_prefixes: config
                .special_tag_prefixes
                .iter()
                .map(|(prefix, field)| (prefix.to_lowercase(), Field::from_name(field)))
                .collect(),
            max_iterations: config.max_metadata_iterations,
            max_value_len: config.max_emoji_value_length,
        }
    }

    pub fn extract(&self, text: &str, line: usize) -> Extraction {
        let protected = protected_spans(text);
        let mut out = Extraction {
            stopped_at: text.len(),
            ..Default::default()
        };
        let mut iterations = 0;
        let mut i = 0;

        while i < text.len() {
            if let Some(span) = protected.iter().find(|r| r.contains(&i)) {
                i = span.end;
                continue;
            }

            let found = self
                .dataview_at(text, i)
                .or_else(|| self.emoji_at(text, i));
            let Some((end, field, value)) = found else {
                i += char_at(text, i).map_or(1, char::len_utf8);
                continue;
            };

            iterations += 1;
            if iterations > self.max_iterations {
                out.stopped_at = i;
                out.limit_hit = Some(ParseError::LimitExceeded {
                    limit: Limit::MetadataIterations,
                    max: self.max_iterations,
                    line,
                });
                break;
            }

            apply(&mut out.metadata, &field, value);
            out.removed.push(i..end);
            i = end;
        }

        out.content = strip_spans(text, &out.removed);
        out
    }

    /// `[key:: value]` starting at `i`
    fn dataview_at<'t>(&self, text: &'t str, i: usize) -> Option<(usize, Field, Value<'t>)> {
        if !self.dataview {
            return None;
        }
        let (end, key, value) = dataview_field(text, i)?;
        Some((end, self.dataview_key(key), Value::Text(value)))
    }

    fn dataview_key(&self, key: &str) -> Field {
        match Field::from_name(key) {
            Field::Other(name) => {
                let lower = name.to_lowercase();
                self.special_tag_prefixes
                    .iter()
                    .find(|(prefix, _)| *prefix == lower)
                    .map(|(_, field)| field.clone())
                    .unwrap_or(Field::Other(name))
            }
            field => field,
        }
    }

    /// An emoji marker and its value span starting at `i`
    fn emoji_at<'t>(&self, text: &'t str, i: usize) -> Option<(usize, Field, Value<'t>)> {
        if !self.emoji {
            return None;
        }
        let (len, emoji, field) = self.markers.match_at(&text[i..])?;
        let after = i + len;

        if *field == Field::Priority {
            let priority = match priority_level(emoji) {
                Some(level) => Priority::Level(level),
                None => Priority::Named(emoji.to_string()),
            };
            return Some((after, Field::Priority, Value::Priority(priority)));
        }

        let rest = &text[after..];
        let vstart = after + (rest.len() - rest.trim_start().len());
        let vend = if field.is_date() {
            date_token_end(text, vstart)
        } else {
            self.value_end(text, vstart)
        };
        Some((vend, field.clone(), Value::Text(text[vstart..vend].trim())))
    }

    /// End of a free-text marker value: the next marker, a `#` or `@`
    /// (attached or not), a `[[` wiki link, a dataview field, a filename
    /// extension followed by whitespace, or the length cap.
    fn value_end(&self, text: &str, start: usize) -> usize {
        let limit = start + char_prefix_len(&text[start..], self.max_value_len);
        let mut j = start;
        while j < limit {
            let rest = &text[j..];
            if (self.emoji && self.markers.match_at(rest).is_some())
                || (self.dataview && dataview_field(text, j).is_some())
            {
                break;
            }
            let Some(c) = rest.chars().next() else { break };
            if c.is_whitespace() && starts_tag_or_context(rest.trim_start()) {
                break;
            }
            if let Some(ext_end) = extension_end(text, j) {
                j = ext_end.min(limit);
                break;
            }
            if c == '#' || c == '@' || rest.starts_with("[[") {
                break;
            }
            j += c.len_utf8();
        }
        j.min(limit)
    }
}

/// A value pulled from a marker
enum Value<'t> {
    Text(&'t str),
    Priority(Priority),
}

fn apply(meta: &mut TaskMetadata, field: &Field, value: Value<'_>) {
    if meta.has(field) && *field != Field::Tags {
        return;
    }
    match value {
        Value::Priority(p) => meta.priority = Some(p),
        Value::Text(text) => {
            if !meta.set_text(field, text) {
                tracing::debug!(field = field.name(), value = text, "dropping unparseable marker value");
            }
        }
    }
}

/// Parse `[key:: value]` at byte `i`: (end, key, value)
pub fn dataview_field(text: &str, i: usize) -> Option<(usize, &str, &str)> {
    let rest = text.get(i..)?;
    if !rest.starts_with('[') || rest.starts_with("[[") {
        return None;
    }
    let close = rest.find(']')?;
    let inner = &rest[1..close];
    let (key, value) = inner.split_once("::")?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() || !key.chars().all(is_word_char) {
        return None;
    }
    Some((i + close + 1, key, value))
}

fn starts_tag_or_context(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('#') | Some('@')) && chars.next().is_some_and(is_word_char)
}

/// If a filename extension starts at `j` and the name ends there (with
/// an optional `#heading`), the offset where the name ends
fn extension_end(text: &str, j: usize) -> Option<usize> {
    let rest = &text[j..];
    if !rest.starts_with('.') || char_before(text, j).is_none_or(char::is_whitespace) {
        return None;
    }
    let ext = FILE_EXTENSIONS.iter().find(|ext| {
        rest.get(..ext.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(ext))
    })?;
    let mut end = j + ext.len();
    if text[end..].starts_with('#') {
        end += text[end..]
            .find(char::is_whitespace)
            .unwrap_or(text.len() - end);
    }
    match char_at(text, end) {
        None => Some(end),
        Some(c) if c.is_whitespace() => Some(end),
        _ => None,
    }
}

/// Dates take only the first whitespace-delimited token
fn date_token_end(text: &str, start: usize) -> usize {
    start
        + text[start..]
            .find(char::is_whitespace)
            .unwrap_or(text.len() - start)
}

/// Convenience for callers holding only a config
pub fn extract(text: &str, config: &ParserConfig) -> Extraction {
    MetadataExtractor::new(config).extract(text, 0)
}
