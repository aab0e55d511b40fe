// src/fetch.rs

//! HTTP fetching.

use std::time::Duration;

use crate::error::Result;

/// User-Agent announced to the polled site.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; linjevakt/1.0)";

/// Fixed request timeout in seconds.
const TIMEOUT_SECS: u64 = 30;

/// HTTP client with the watcher's fixed fetch policy.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Create a configured fetcher.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch one page and return its raw HTML.
    ///
    /// Connection failures, timeouts, and non-success status codes are all
    /// transport errors. No retry happens here; the scheduler simply tries
    /// again next interval.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_builds() {
        assert!(PageFetcher::new().is_ok());
    }
}
