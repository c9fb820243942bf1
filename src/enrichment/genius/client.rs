//! Genius HTTP client
//!
//! Two requests per song: an authenticated search against the API, then a
//! plain GET of the matched song page to read the lyrics markup.
//! See: https://docs.genius.com
//!
//! Requests are spaced at least `sleep_time` apart across all concurrent
//! callers sharing the client.
//!
//! No retries happen here; callers wrap [`GeniusClient::fetch_lyrics`] in the
//! retry policy they want.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{adapter, dto};
use crate::enrichment::domain::{LyricsError, ProviderFault};

/// Default Genius API root.
pub const DEFAULT_ENDPOINT: &str = "https://api.genius.com";

/// Default minimum spacing between requests.
pub const DEFAULT_SLEEP_TIME: Duration = Duration::from_secs(1);

/// Genius API client
pub struct GeniusClient {
    access_token: String,
    http_client: reqwest::Client,
    base_url: String,
    remove_section_headers: bool,
    sleep_time: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl GeniusClient {
    /// Create a new client with the given access token
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send a User-Agent identifying the application
    /// - Time out individual requests after `timeout`
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Self {
        Self::with_base_url(access_token, DEFAULT_ENDPOINT, timeout)
    }

    /// Create a client against a custom API root
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            access_token: access_token.into(),
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            remove_section_headers: true,
            sleep_time: DEFAULT_SLEEP_TIME,
            last_request: Mutex::new(None),
        }
    }

    /// Minimum pause between two requests to Genius.
    pub fn sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    /// Keep or strip `[Verse]`-style section headers in returned lyrics.
    pub fn remove_section_headers(mut self, remove: bool) -> Self {
        self.remove_section_headers = remove;
        self
    }

    /// Fetch the lyrics for a song.
    ///
    /// Fails with [`LyricsError::NotFound`] when no song matches or the page
    /// carries no lyrics, and with [`LyricsError::Provider`] for anything else.
    pub async fn fetch_lyrics(&self, title: &str, artist: &str) -> Result<String, LyricsError> {
        let search = self
            .send_search_request(title, artist)
            .await
            .map_err(|cause| LyricsError::provider(title, artist, cause))?;

        let hits = search.response.map(|r| r.hits).unwrap_or_default();
        let Some(song) = adapter::pick_song(&hits, artist) else {
            return Err(LyricsError::not_found(title, artist));
        };

        tracing::debug!(title, artist, song_id = song.id, url = %song.url, "Matched Genius song");

        let html = self
            .fetch_page(&song.url)
            .await
            .map_err(|cause| LyricsError::provider(title, artist, cause))?;

        let Some(lyrics) = adapter::extract_lyrics(&html) else {
            return Err(LyricsError::not_found(title, artist));
        };

        let lyrics = if self.remove_section_headers {
            adapter::strip_section_headers(&lyrics)
        } else {
            lyrics
        };

        if lyrics.trim().is_empty() {
            return Err(LyricsError::not_found(title, artist));
        }
        Ok(lyrics)
    }

    /// Send the search request and parse the response
    async fn send_search_request(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<dto::SearchResponse, ProviderFault> {
        let url = self.search_url(title, artist);

        self.pace().await;
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderFault::from_status(status));
        }

        let body = response
            .json::<dto::SearchResponse>()
            .await
            .map_err(|e| ProviderFault::Parse(e.to_string()))?;

        if body.meta.status != 200 {
            return Err(ProviderFault::InvalidResponse(format!(
                "meta status {}: {}",
                body.meta.status,
                body.meta.message.as_deref().unwrap_or("no message")
            )));
        }

        Ok(body)
    }

    /// Download a song page
    async fn fetch_page(&self, url: &str) -> Result<String, ProviderFault> {
        self.pace().await;
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderFault::from_status(status));
        }

        Ok(response.text().await?)
    }

    /// Wait until `sleep_time` has passed since the previous request.
    ///
    /// The lock is held across the sleep so concurrent callers queue up.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.sleep_time {
                tokio::time::sleep(self.sleep_time - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn search_url(&self, title: &str, artist: &str) -> String {
        let query = format!("{} {}", title, artist);
        format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(query.trim())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GeniusClient::new("token", Duration::from_secs(10));
        assert_eq!(client.base_url, DEFAULT_ENDPOINT);
        assert!(client.remove_section_headers);
        assert_eq!(client.sleep_time, DEFAULT_SLEEP_TIME);
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let client = GeniusClient::new("token", Duration::from_secs(1))
            .sleep_time(Duration::from_millis(30));

        let start = Instant::now();
        client.pace().await;
        assert!(start.elapsed() < Duration::from_millis(30));

        client.pace().await;
        client.pace().await;
        // Two gaps after the first request
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_the_gate() {
        let client = GeniusClient::new("token", Duration::from_secs(1))
            .sleep_time(Duration::from_millis(30));

        let start = Instant::now();
        tokio::join!(client.pace(), client.pace(), client.pace());
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_zero_sleep_time_does_not_wait() {
        let client = GeniusClient::new("token", Duration::from_secs(1)).sleep_time(Duration::ZERO);

        let start = Instant::now();
        for _ in 0..5 {
            client.pace().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_client_with_custom_url() {
        let client =
            GeniusClient::with_base_url("token", "http://localhost:8080/", Duration::from_secs(1))
                .remove_section_headers(false);
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(!client.remove_section_headers);
    }

    #[test]
    fn test_search_url_encodes_query() {
        let client = GeniusClient::new("token", Duration::from_secs(10));
        assert_eq!(
            client.search_url("Don't Stop", "Queen & Co"),
            "https://api.genius.com/search?q=Don%27t%20Stop%20Queen%20%26%20Co"
        );
    }
}
