//! Lyrics text normalization.
//!
//! Pure and deterministic: identical input always produces byte-identical
//! output. Steps, in order:
//!
//! 1. A newline directly between two ASCII letters becomes a space
//!    (a wrapped sung line rather than a stanza break)
//! 2. Every remaining newline becomes a space
//! 3. `[...]` annotations are removed, shortest match first
//! 4. Whitespace runs collapse to a single space
//! 5. ASCII punctuation is removed
//! 6. The text is lower-cased
//! 7. Fewer than [`MIN_WORDS`] whitespace-separated tokens yields `None`
//!
//! Leading and trailing spaces are kept. The sentiment cache key for id-less
//! records is a digest of this exact output.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum number of words for text to be worth classifying.
pub const MIN_WORDS: usize = 5;

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid bracket regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalize raw lyrics, or return `None` if too little text remains.
pub fn normalize(raw_lyrics: &str) -> Option<String> {
    let joined = join_wrapped_lines(raw_lyrics);
    let single_line = joined.replace('\n', " ");
    let unannotated = BRACKETED.replace_all(&single_line, "");
    let collapsed = WHITESPACE_RUN.replace_all(&unannotated, " ");
    let unpunctuated: String = collapsed
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let clean = unpunctuated.to_lowercase();

    if word_count(&clean) < MIN_WORDS {
        None
    } else {
        Some(clean)
    }
}

/// Number of whitespace-separated tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Replace `\n` with a space where both neighbours are ASCII letters.
///
/// Neighbours are checked against the original text, so consecutive wrapped
/// lines (`a\nb\nc`) are all joined.
fn join_wrapped_lines(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let between_letters = c == '\n'
            && i > 0
            && chars[i - 1].is_ascii_alphabetic()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_alphabetic());
        out.push(if between_letters { ' ' } else { c });
    }

    out
}
