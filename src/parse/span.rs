use std::ops::Range;

const URL_SCHEMES: [&str; 5] = ["https://", "http://", "ftp://", "file://", "mailto:"];

/// Byte ranges of `text` that must never be scanned for tags or
/// contexts: wiki links (nested ones included), markdown links, inline
/// code, bare URLs and hex colour codes.
pub fn protected_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = wiki_link_spans(text);
    spans.extend(code_spans(text));
    for found in [markdown_link_spans(text), url_spans(text), color_code_spans(text)] {
        let outside: Vec<Range<usize>> = found
            .into_iter()
            .filter(|r| !in_spans(&spans, r.start))
            .collect();
        spans.extend(outside);
    }
    spans.sort_by_key(|r| r.start);
    spans
}

pub fn in_spans(spans: &[Range<usize>], idx: usize) -> bool {
    spans.iter().any(|r| r.contains(&idx))
}

/// Remove `spans` from `text`. Whitespace left doubled at a removal seam
/// is collapsed, and the result is trimmed.
pub fn strip_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut sorted: Vec<&Range<usize>> = spans.iter().collect();
    sorted.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in sorted {
        if span.start < cursor {
            cursor = cursor.max(span.end);
            continue;
        }
        push_joined(&mut out, &text[cursor..span.start]);
        cursor = span.end;
    }
    push_joined(&mut out, &text[cursor..]);
    out.trim().to_string()
}

fn push_joined(out: &mut String, piece: &str) {
    if out.ends_with(char::is_whitespace) {
        out.push_str(piece.trim_start());
    } else {
        out.push_str(piece);
    }
}

fn wiki_link_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'[' && bytes[i + 1] == b'[' {
            if depth == 0 {
                start = i;
            }
            depth += 1;
            i += 2;
        } else if depth > 0 && bytes[i] == b']' && bytes[i + 1] == b']' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                spans.push(start..i);
            }
        } else {
            i += 1;
        }
    }
    spans
}

fn code_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run = backtick_run(bytes, i);
        let mut j = i + run;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let close = backtick_run(bytes, j);
                if close == run {
                    closed = Some(j + close);
                    break;
                }
                j += close;
            } else {
                j += 1;
            }
        }
        match closed {
            Some(end) => {
                spans.push(i..end);
                i = end;
            }
            None => i += run,
        }
    }
    spans
}

fn backtick_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|&&b| b == b'`').count()
}

fn markdown_link_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let is_open = bytes[i] == b'['
            && bytes.get(i + 1) != Some(&b'[')
            && (i == 0 || bytes[i - 1] != b'[');
        if !is_open {
            i += 1;
            continue;
        }
        let Some(close) = text[i + 1..].find(']').map(|p| i + 1 + p) else {
            break;
        };
        if text[i + 1..close].contains('[') || bytes.get(close + 1) != Some(&b'(') {
            i += 1;
            continue;
        }
        match text[close + 2..].find(')') {
            Some(p) => {
                let end = close + 2 + p + 1;
                spans.push(i..end);
                i = end;
            }
            None => i += 1,
        }
    }
    spans
}

fn url_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let scheme = URL_SCHEMES.iter().find(|s| {
            rest.get(..s.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(s))
        });
        let at_word_start = text[..i]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        match scheme {
            Some(_) if at_word_start => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || c == '>' || c == '<')
                    .unwrap_or(rest.len());
                spans.push(i..i + len);
                i += len;
            }
            _ => {
                i += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    spans
}

/// `#rgb` / `#rrggbb` standing alone, not glued to letters or digits
fn color_code_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    for (i, _) in text.match_indices('#') {
        if i > 0 && bytes[i - 1].is_ascii_alphanumeric() {
            continue;
        }
        let digits = bytes[i + 1..]
            .iter()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        let end = i + 1 + digits;
        if (digits == 3 || digits == 6) && !bytes.get(end).is_some_and(u8::is_ascii_alphanumeric) {
            spans.push(i..end);
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered<'a>(text: &'a str, spans: &[Range<usize>]) -> Vec<&'a str> {
        spans.iter().map(|r| &text[r.clone()]).collect()
    }

    #[test]
    fn test_wiki_link_span() {
        let text = "Task [[Note#Title|Title]] #real-tag";
        let spans = protected_spans(text);
        assert_eq!(covered(text, &spans), vec!["[[Note#Title|Title]]"]);
    }

    #[test]
    fn test_nested_wiki_links() {
        let text = "see [[outer [[inner#h]] more]] #tag";
        let spans = protected_spans(text);
        assert_eq!(covered(text, &spans), vec!["[[outer [[inner#h]] more]]"]);
    }

    #[test]
    fn test_unclosed_wiki_link_not_protected() {
        assert!(protected_spans("oops [[Note#tag").is_empty());
    }

    #[test]
    fn test_markdown_link_and_code() {
        let text = "read [docs](https://x.io/#a) and `#not-tag` #tag";
        let spans = protected_spans(text);
        assert_eq!(
            covered(text, &spans),
            vec!["[docs](https://x.io/#a)", "`#not-tag`"]
        );
    }

    #[test]
    fn test_bare_url() {
        let text = "see https://example.com/page#anchor #tag";
        let spans = protected_spans(text);
        assert_eq!(covered(text, &spans), vec!["https://example.com/page#anchor"]);
    }

    #[test]
    fn test_color_codes() {
        let text = "Set color #ff0000 and #fff, not #fade or #ff00001 or a#abc";
        let spans = protected_spans(text);
        assert_eq!(covered(text, &spans), vec!["#ff0000", "#fff"]);
    }

    #[test]
    fn test_dataview_field_is_not_a_link() {
        assert!(protected_spans("[due:: 2024-01-01] #tag").is_empty());
    }

    #[test]
    fn test_strip_spans_collapses_seams() {
        let text = "Fix #bug in parser #p1";
        let spans = vec![4..8, 19..22];
        assert_eq!(strip_spans(text, &spans), "Fix in parser");
    }

    #[test]
    fn test_strip_spans_keeps_inner_spacing() {
        assert_eq!(strip_spans("a  b #t", &[5..7]), "a  b");
    }
}
