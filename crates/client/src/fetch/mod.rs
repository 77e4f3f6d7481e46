//! HTTP fetcher for category pages.
//!
//! ### Limits
//! - Max redirects: 5 (configurable)
//! - Max body bytes: 5MB (configurable)
//! - Request timeout: 18s (configurable)
//!
//! Pages are kept as text in [`ParsedContent`] and parsed on demand, since a
//! parsed `scraper::Html` cannot be held across an await point.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use scraper::Html;
use url::Url;

use clubwatch_core::{AppConfig, Error};

/// Where a category's content lives: a page and, optionally, the section of
/// it that is fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub url: Url,
    pub selector: Option<String>,
}

impl Locator {
    /// Build a locator from a URL string.
    pub fn parse(url: &str, selector: Option<&str>) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
        }
        Ok(Self { url, selector: selector.map(str::to_string) })
    }
}

/// A fetched page.
#[derive(Debug, Clone)]
pub struct ParsedContent {
    pub url: Url,
    pub selector: Option<String>,
    pub body: String,
}

impl ParsedContent {
    pub fn new(locator: &Locator, body: impl Into<String>) -> Self {
        Self { url: locator.url.clone(), selector: locator.selector.clone(), body: body.into() }
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Parse the body into a document tree.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Source of page content for the pipeline.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, locator: &Locator) -> Result<ParsedContent, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 18s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from_app(&AppConfig::default())
    }
}

impl FetchConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// HTTP fetch client with size and redirect limits.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }


    fn too_large(&self, len: usize) -> Error {
        Error::FetchTooLarge(format!("{len} bytes exceeds {}", self.config.max_bytes))
    }
}

fn request_error(url: &Url, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::HttpError(format!("network error for {url}: {err}"))
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, locator: &Locator) -> Result<ParsedContent, Error> {
        let start = Instant::now();
        let url = &locator.url;

        let response = self
            .http
            .get(url.as_str())
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "tr-TR,tr;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {url}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let bytes = response.bytes().await.map_err(|e| request_error(url, &e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(self.too_large(bytes.len()));
        }
        if bytes.is_empty() {
            return Err(Error::HttpError(format!("empty body from {url}")));
        }

        let body = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!(
            url = %url,
            fetch_ms = start.elapsed().as_millis() as u64,
            bytes = bytes.len(),
            "fetched page"
        );

        Ok(ParsedContent::new(locator, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_from_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(18000));
        assert_eq!(config.max_redirects, 5);
        assert!(!config.user_agent.is_empty());
    }

    #[test]
    fn test_locator_parse() {
        let locator = Locator::parse("https://example.com/club/startseite/verein/1", Some("table.items")).unwrap();
        assert_eq!(locator.url.host_str(), Some("example.com"));
        assert_eq!(locator.selector.as_deref(), Some("table.items"));
    }

    #[test]
    fn test_locator_rejects_bad_urls() {
        assert!(matches!(Locator::parse("not a url", None), Err(Error::InvalidUrl(_))));
        assert!(matches!(Locator::parse("ftp://example.com/x", None), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_parsed_content_reparses() {
        let locator = Locator::parse("https://example.com/", Some("p")).unwrap();
        let content = ParsedContent::new(&locator, "<p>hello</p>");
        assert_eq!(content.selector(), Some("p"));
        let doc = content.document();
        assert_eq!(doc.root_element().text().collect::<String>(), "hello");
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }
}
