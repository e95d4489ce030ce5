//! Character-bounded document chunking.
//!
//! Embedding endpoints truncate long inputs silently, so documents are cut
//! into contiguous chunks of at most `max_chars` characters before embedding.
//! Chunks never overlap and their concatenation reconstructs the input byte
//! for byte.

/// Splits `text` into contiguous chunks of at most `max_chars` characters.
///
/// Splitting happens on char boundaries, never inside a multi-byte sequence.
/// An empty input yields no chunks. `max_chars == 0` is treated as 1.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            out.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
