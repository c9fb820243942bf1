//! Genius lyrics integration
//!
//! Finds a song through the Genius search API, then extracts the lyrics from
//! the song page (the API itself does not serve lyrics text).
//!
//! API docs: https://docs.genius.com

pub mod dto;
mod adapter;
mod client;

pub use adapter::{extract_lyrics, pick_song, strip_section_headers};
pub use client::{DEFAULT_ENDPOINT, DEFAULT_SLEEP_TIME, GeniusClient};
