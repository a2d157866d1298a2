//! Document source adapter: URL fetching and paragraph extraction.
//!
//! The classification core never touches networking. This adapter is the one
//! place HTTP happens: it fetches a page within a bounded timeout, extracts
//! the paragraph text, and fails closed. Any network or HTTP error degrades
//! to empty text, which the inference service's minimum-length check turns
//! into an `InputTooShort` error for the caller, never a crash.

use std::time::Duration;

use scraper::{Html, Selector};

use crate::error::{Result, TaxonError};
use crate::inference::normalize_whitespace;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("taxon/", env!("CARGO_PKG_VERSION"));

/// Request timeout. Fetching blocks at most this long before failing closed.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Heuristic check for whether input looks like a URL rather than raw text.
///
/// Requires an http(s) scheme followed by a non-empty host with no embedded
/// whitespace.
pub fn looks_like_url(input: &str) -> bool {
    let trimmed = input.trim();
    let rest = match trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return false,
    };
    !rest.is_empty() && !trimmed.contains(char::is_whitespace)
}

/// Fetches pages and extracts their paragraph text.
pub struct PageFetcher {
    client: reqwest::blocking::Client,
    paragraph: Selector,
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("timeout", &FETCH_TIMEOUT)
            .finish()
    }
}

impl PageFetcher {
    /// Create a fetcher with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| {
                TaxonError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        let paragraph =
            Selector::parse("p").map_err(|e| TaxonError::configuration(e.to_string()))?;

        Ok(PageFetcher { client, paragraph })
    }

    /// Fetch a URL and return its paragraph text with collapsed whitespace.
    ///
    /// Fails closed: any network error, HTTP error status, or body read
    /// failure logs a warning and returns the empty string.
    pub fn fetch_text(&self, url: &str) -> String {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "request failed; treating page as empty");
                return String::new();
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "HTTP error; treating page as empty");
                return String::new();
            }
        };

        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url, error = %e, "body read failed; treating page as empty");
                return String::new();
            }
        };

        self.extract_paragraph_text(&body)
    }

    /// Extract and join the text of all `<p>` elements in an HTML document.
    pub fn extract_paragraph_text(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let joined: Vec<String> = document
            .select(&self.paragraph)
            .map(|p| p.text().collect::<Vec<_>>().join(" "))
            .collect();

        normalize_whitespace(&joined.join(" "))
    }
}
