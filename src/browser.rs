//! Browser boundary used by the HTTP checks.
//!
//! Every [`Browser::open`] call starts a fresh session, so custom request
//! headers configured for one navigation never leak into the next.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Default product token of [`HttpBrowser`]'s user agent
pub const AGENT_TOKEN: &str = env!("CARGO_PKG_NAME");

/// A loaded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub source: String,
}

impl Page {
    /// Text of the first `<title>` element with whitespace collapsed, or an
    /// empty string when the document has none.
    pub fn title(&self) -> String {
        let lower = self.source.to_ascii_lowercase();
        let Some(open) = lower.find("<title") else {
            return String::new();
        };
        let Some(start) = lower[open..].find('>').map(|end| open + end + 1) else {
            return String::new();
        };
        let end = lower[start..]
            .find("</title")
            .map(|end| start + end)
            .unwrap_or(lower.len());

        self.source[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub trait Browser {
    /// Product token carried in the user agent; identifies our requests in
    /// the server access log
    fn agent_token(&self) -> &str;

    /// Navigates to `url` in a new session carrying `headers` on every request
    fn open(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page>;

    /// Like [`Browser::open`], giving up once `timeout` has passed
    fn open_within(&self, url: &str, headers: &[(&str, &str)], _timeout: Duration) -> Result<Page> {
        self.open(url, headers)
    }
}

/// Headless [`Browser`] speaking plain HTTP
pub struct HttpBrowser {
    agent_token: String,
    user_agent: String,
    timeout: Duration,
}

impl HttpBrowser {
    pub fn new(timeout: Duration) -> Self {
        Self::with_agent_token(AGENT_TOKEN, timeout)
    }

    pub fn with_agent_token(token: &str, timeout: Duration) -> Self {
        Self {
            agent_token: token.to_string(),
            user_agent: format!(
                "Mozilla/5.0 (compatible; {}/{})",
                token,
                env!("CARGO_PKG_VERSION")
            ),
            timeout,
        }
    }

    fn session(&self, headers: &[(&str, &str)], timeout: Duration) -> Result<Client> {
        let mut defaults = HeaderMap::new();
        for (name, value) in headers {
            defaults.insert(
                HeaderName::from_bytes(name.as_bytes())
                    .with_context(|| format!("Invalid header name: {}", name))?,
                HeaderValue::from_str(value)
                    .with_context(|| format!("Invalid value for header {}", name))?,
            );
        }

        Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(defaults)
            .timeout(timeout)
            .build()
            .context("Failed to start browser session")
    }
}

impl Browser for HttpBrowser {
    fn agent_token(&self) -> &str {
        &self.agent_token
    }

    fn open(&self, url: &str, headers: &[(&str, &str)]) -> Result<Page> {
        self.open_within(url, headers, self.timeout)
    }

    fn open_within(&self, url: &str, headers: &[(&str, &str)], timeout: Duration) -> Result<Page> {
        let timeout = timeout.min(self.timeout);
        debug!(
            "GET {} with {} custom header(s), timeout {:?}",
            url,
            headers.len(),
            timeout
        );
        let response = self
            .session(headers, timeout)?
            .get(url)
            .send()
            .with_context(|| format!("Failed to load {}", url))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let source = response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))?;

        Ok(Page {
            url: final_url,
            status,
            source,
        })
    }
}
