//! News retrieval: a single best-effort fetch of a Google News search feed.

use anyhow::Result;
use async_trait::async_trait;
use feed_rs::parser;
use reqwest::{cookie::Jar, header};
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};
use url::Url;

use crate::article::{Publisher, RawArticle};
use crate::TARGET_WEB_REQUEST;

const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How far back a search reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Quarter,
}

impl Period {
    /// Value for the `when:` search operator.
    pub fn as_query(&self) -> &'static str {
        match self {
            Period::Day => "1d",
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Quarter => "90d",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Period::Day => "1d",
            Period::Week => "7d",
            Period::Month => "1m",
            Period::Quarter => "3m",
        };
        f.write_str(code)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "1m" | "30d" => Ok(Period::Month),
            "3m" | "90d" => Ok(Period::Quarter),
            other => Err(format!("unknown period '{}', expected 1d, 7d, 1m or 3m", other)),
        }
    }
}

/// Supplies raw article records for a query.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, query: &str, period: Period, max_results: usize) -> Result<Vec<RawArticle>>;
}

/// Google News RSS search for one language/country edition.
pub struct GoogleNewsSource {
    client: reqwest::Client,
    language: String,
    country: String,
}

impl GoogleNewsSource {
    pub fn new(language: &str, country: &str) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            language: language.to_string(),
            country: country.to_string(),
        })
    }

    pub fn search_url(&self, query: &str, period: Period) -> Result<Url> {
        let mut url = Url::parse(GOOGLE_NEWS_SEARCH)?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{} when:{}", query.trim(), period.as_query()))
            .append_pair("hl", &self.language)
            .append_pair("gl", &self.country)
            .append_pair("ceid", &format!("{}:{}", self.country, self.language));
        Ok(url)
    }
}

fn create_http_client() -> Result<reqwest::Client> {
    let cookie_store = Jar::default();
    reqwest::Client::builder()
        .cookie_store(true)
        .cookie_provider(Arc::new(cookie_store))
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}

/// Split a Google News headline "Title - Publisher" into its publisher part.
fn publisher_from_title(title: &str) -> Option<String> {
    title
        .rsplit_once(" - ")
        .map(|(_, publisher)| publisher.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Parse an RSS/Atom body into at most `max_results` raw articles.
///
/// Entries without a link are skipped.
pub fn parse_feed(body: &str, max_results: usize) -> Result<Vec<RawArticle>> {
    let feed = parser::parse(io::Cursor::new(body.as_bytes()))
        .map_err(|e| anyhow::anyhow!("Failed to parse news feed: {}", e))?;
    debug!(target: TARGET_WEB_REQUEST, "Parsed feed with {} entries", feed.entries.len());

    let mut articles = Vec::new();
    for entry in feed.entries {
        if articles.len() >= max_results {
            break;
        }
        let Some(url) = entry.links.first().map(|link| link.href.clone()) else {
            warn!(target: TARGET_WEB_REQUEST, "Feed entry missing link, skipping");
            continue;
        };
        let title = entry.title.map(|t| t.content).unwrap_or_default();
        let publisher = publisher_from_title(&title).map(|name| Publisher {
            title: Some(name),
            href: None,
        });

        articles.push(RawArticle {
            description: entry.summary.map(|s| s.content),
            published_date: entry.published.map(|d| d.to_rfc2822()),
            publisher,
            title,
            url,
        });
    }
    Ok(articles)
}

#[async_trait]
impl NewsSource for GoogleNewsSource {
    async fn fetch(&self, query: &str, period: Period, max_results: usize) -> Result<Vec<RawArticle>> {
        let url = self.search_url(query, period)?;
        info!(target: TARGET_WEB_REQUEST, "Loading news feed from {}", url);

        let response = timeout(
            REQUEST_TIMEOUT,
            self.client
                .get(url.as_str())
                .header(header::USER_AGENT, "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
                .header(header::ACCEPT, "application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9")
                .send(),
        )
        .await
        .map_err(|_| {
            anyhow::anyhow!("Request to {} timed out after {} seconds", url, REQUEST_TIMEOUT.as_secs())
        })??;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("News feed request failed with HTTP {}", response.status()));
        }
        let body = response.text().await?;
        debug!(
            target: TARGET_WEB_REQUEST,
            "First 500 characters of response body: {}",
            body.chars().take(500).collect::<String>()
        );

        let articles = parse_feed(&body, max_results)?;
        info!(target: TARGET_WEB_REQUEST, "Fetched {} articles for '{}'", articles.len(), query);
        Ok(articles)
    }
}
