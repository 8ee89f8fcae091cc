use unicode_segmentation::UnicodeSegmentation;

/// Number of grapheme clusters (user-perceived characters)
pub fn grapheme_len(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Keep at most `max` grapheme clusters, never splitting a cluster.
pub fn truncate_graphemes(s: &str, max: usize) -> &str {
    match s.grapheme_indices(true).nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Keep at most `max` chars. Returns the byte length kept.
pub fn char_prefix_len(s: &str, max: usize) -> usize {
    match s.char_indices().nth(max) {
        Some((end, _)) => end,
        None => s.len(),
    }
}

/// Characters allowed inside a tag segment: letters and digits from any
/// script, `_` and `-`. CJK punctuation and emoji end the tag.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Word characters plus the `/` segment separator
pub fn is_tag_char(c: char) -> bool {
    is_word_char(c) || c == '/'
}

/// The character ending just before byte offset `idx`
pub fn char_before(s: &str, idx: usize) -> Option<char> {
    s[..idx].chars().next_back()
}

/// The character starting at byte offset `idx`
pub fn char_at(s: &str, idx: usize) -> Option<char> {
    s.get(idx..).and_then(|rest| rest.chars().next())
}

/// Whether the byte at `idx` is escaped by an odd run of backslashes
pub fn is_escaped(s: &str, idx: usize) -> bool {
    let run = s[..idx].bytes().rev().take_while(|&b| b == b'\\').count();
    run % 2 == 1
}
