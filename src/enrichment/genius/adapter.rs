//! Adapter layer: turn Genius search hits and song pages into lyrics text
//!
//! This is the ONLY place that knows about Genius markup. If the page layout
//! changes, only this file and dto.rs need to change.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::dto;

/// Attribute marking a block of lyrics on a song page.
const LYRICS_CONTAINER: &str = r#"data-lyrics-container="true""#;

/// Attribute marking page furniture nested inside lyrics blocks.
const EXCLUDED_BLOCK: &str = r#"data-exclude-from-selection="true""#;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex")
});

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid header regex"));

/// Choose the search hit that best matches the requested song.
///
/// Prefers a song whose primary artist matches `artist` (case-insensitive,
/// either name containing the other), else the first song hit.
pub fn pick_song<'a>(hits: &'a [dto::Hit], artist: &str) -> Option<&'a dto::SongResult> {
    let wanted = artist.trim().to_lowercase();
    let songs = || hits.iter().filter(|h| h.hit_type == "song").map(|h| &h.result);

    songs()
        .find(|song| {
            song.primary_artist.as_ref().is_some_and(|a| {
                let name = a.name.to_lowercase();
                !wanted.is_empty() && (name.contains(&wanted) || wanted.contains(&name))
            })
        })
        .or_else(|| songs().next())
}

/// Extract the lyrics text from a song page.
///
/// Returns `None` when the page has no lyrics blocks or they are empty.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let blocks: Vec<String> = div_blocks(html, LYRICS_CONTAINER)
        .into_iter()
        .map(|block| {
            let inner = &html[block.content.0..block.content.1];
            block_text(&remove_blocks(inner, EXCLUDED_BLOCK))
        })
        .collect();

    let text = blocks.join("\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Remove `[Section]` headers and the blank lines they leave behind.
pub fn strip_section_headers(lyrics: &str) -> String {
    let without = SECTION_HEADER.replace_all(lyrics, "");
    without.replace("\n\n", "\n").trim_matches('\n').to_string()
}

/// Byte ranges of one `<div ...>...</div>` element.
struct DivBlock {
    /// Whole element including tags
    outer: (usize, usize),
    /// Between the opening and closing tag
    content: (usize, usize),
}

/// Find every top-level div carrying `marker` in its opening tag.
fn div_blocks(html: &str, marker: &str) -> Vec<DivBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(found) = html[cursor..].find(marker) {
        let marker_at = cursor + found;
        let in_div_tag = html[cursor..marker_at]
            .rfind('<')
            .map(|i| cursor + i)
            .filter(|&start| {
                html[start..].starts_with("<div") && !html[start..marker_at].contains('>')
            });
        let Some(open_start) = in_div_tag else {
            // Marker in text content or another tag
            cursor = marker_at + marker.len();
            continue;
        };
        let Some(open_end) = html[marker_at..].find('>').map(|i| marker_at + i + 1) else {
            break;
        };

        match matching_close(html, open_end) {
            Some((close_start, close_end)) => {
                blocks.push(DivBlock {
                    outer: (open_start, close_end),
                    content: (open_end, close_start),
                });
                cursor = close_end;
            }
            // Unbalanced markup: take the rest of the document
            None => {
                blocks.push(DivBlock {
                    outer: (open_start, html.len()),
                    content: (open_end, html.len()),
                });
                break;
            }
        }
    }

    blocks
}

/// Find the `</div>` closing a div whose content starts at `from`.
fn matching_close(html: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let next_open = find_div_open(html, pos);
        let next_close = html[pos..].find("</div").map(|i| pos + i)?;

        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                pos = open + 4;
            }
            _ => {
                depth -= 1;
                let close_end = html[next_close..].find('>').map(|i| next_close + i + 1)?;
                if depth == 0 {
                    return Some((next_close, close_end));
                }
                pos = close_end;
            }
        }
    }
}

/// Position of the next `<div` opening tag (not `<divider` or similar).
fn find_div_open(html: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(i) = html[pos..].find("<div") {
        let at = pos + i;
        match html[at + 4..].chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => return Some(at),
            None => return None,
            _ => pos = at + 4,
        }
    }
    None
}

/// Drop every div carrying `marker`, including its content.
fn remove_blocks(html: &str, marker: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for block in div_blocks(html, marker) {
        out.push_str(&html[last..block.outer.0]);
        last = block.outer.1;
    }
    out.push_str(&html[last..]);
    out
}

/// Plain text of an HTML fragment, keeping line breaks.
fn block_text(fragment: &str) -> String {
    let with_newlines = LINE_BREAK.replace_all(fragment, "\n");
    let untagged = TAG.replace_all(&with_newlines, "");
    decode_entities(&untagged)
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
