//! Case-insensitive keyword search and snippet extraction
//!
//! Positions and the snippet radius are counted in characters (Unicode
//! scalar values), never bytes, so a snippet can't split a multi-byte
//! character.

/// Characters of context kept on each side of a keyword match
pub const SNIPPET_RADIUS: usize = 50;

/// Marker wrapped around every snippet
pub const ELLIPSIS: &str = "...";

/// Lower-case a string, folding a word-final `Σ` to `ς`.
///
/// Both the document and the keywords go through this so their foldings agree.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// A lower-cased copy of a text that can map folded positions back to the original.
#[derive(Debug)]
pub struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    /// Byte offset in `folded` where the folding of original char `i` begins
    folded_starts: Vec<usize>,
    /// Byte offset in `original` of char `i`, plus a trailing `original.len()`
    original_offsets: Vec<usize>,
}

/// First occurrence of a keyword, as a character span of the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch {
    pub start: usize,
    pub end: usize,
}

impl<'a> FoldedText<'a> {
    pub fn new(original: &'a str) -> Self {
        let folded = fold_case(original);
        let mut folded_starts = Vec::with_capacity(original.len());
        let mut original_offsets = Vec::with_capacity(original.len() + 1);

        // The contextual fold only swaps `σ` for `ς`, which has the same
        // encoded length, so per-char lengths still locate every char
        let mut folded_len = 0;
        for (offset, c) in original.char_indices() {
            original_offsets.push(offset);
            folded_starts.push(folded_len);
            folded_len += c.to_lowercase().map(char::len_utf8).sum::<usize>();
        }
        original_offsets.push(original.len());

        Self {
            original,
            folded,
            folded_starts,
            original_offsets,
        }
    }

    /// Length of the original text in characters
    pub fn char_len(&self) -> usize {
        self.folded_starts.len()
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Leftmost case-insensitive occurrence of `keyword`.
    ///
    /// An empty keyword occurs everywhere, so it matches the empty span at 0.
    pub fn find(&self, keyword: &str) -> Option<KeywordMatch> {
        let needle = fold_case(keyword);
        if needle.is_empty() {
            return Some(KeywordMatch { start: 0, end: 0 });
        }

        let byte_start = self.folded.find(&needle)?;
        let byte_end = byte_start + needle.len();

        // folded_starts[0] == 0, so at least one entry is <= byte_start
        let start = self.folded_starts.partition_point(|&s| s <= byte_start) - 1;
        let end = self.folded_starts.partition_point(|&s| s < byte_end);

        Some(KeywordMatch { start, end })
    }

    /// Original text between two character positions
    pub fn slice_chars(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.char_len());
        let start = start.min(end);
        &self.original[self.original_offsets[start]..self.original_offsets[end]]
    }

    /// Context around a match, `radius` characters each side, clamped to the text.
    ///
    /// The ellipsis markers are added even when the window touches either end.
    pub fn snippet(&self, found: KeywordMatch, radius: usize) -> String {
        let (start, end) = snippet_window(found, radius, self.char_len());
        format!("{ELLIPSIS}{}{ELLIPSIS}", self.slice_chars(start, end))
    }
}

/// Character window `[start, end)` around a match, clamped to `[0, len]`
pub fn snippet_window(found: KeywordMatch, radius: usize, len: usize) -> (usize, usize) {
    let start = found.start.saturating_sub(radius);
    let end = found.end.saturating_add(radius).min(len);
    (start, end)
}

/// Snippet around the first occurrence of `keyword`, if any
pub fn extract_snippet(text: &str, keyword: &str) -> Option<String> {
    let folded = FoldedText::new(text);
    folded
        .find(keyword)
        .map(|found| folded.snippet(found, SNIPPET_RADIUS))
}
