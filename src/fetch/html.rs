//! HTML page source
//!
//! Downloads a page and extracts items with CSS selectors. Every fetch goes
//! to the network; the last good result per page is kept on disk and served
//! only when the page can't be fetched.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{ContentSource, FetchError};
use crate::cache::CacheManager;
use crate::content::{ContentKind, Item, Theme};

/// Time-to-live for cached page results in hours
///
/// Entries past their TTL are still served on failure, flagged as expired in
/// the logs.
const CACHE_TTL_HOURS: u64 = 12;

/// Items kept per page
const DEFAULT_MAX_ITEMS: usize = 5;

/// CSS selectors describing where items live on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelectors {
    /// Matches one element per item
    pub item: String,
    /// Text inside the item; the item element's own text when `None`
    pub text: Option<String>,
    /// Author inside the item
    pub author: Option<String>,
}

impl SourceSelectors {
    /// Creates a selector set from borrowed CSS strings
    ///
    /// # Arguments
    /// * `item` - Selector matching one element per item
    /// * `text` - Selector for the text within an item, if not the whole element
    /// * `author` - Selector for the author within an item
    pub fn new(item: &str, text: Option<&str>, author: Option<&str>) -> Self {
        Self {
            item: item.to_string(),
            text: text.map(str::to_string),
            author: author.map(str::to_string),
        }
    }
}

/// A page scraped for quotes or good deeds
#[derive(Debug, Clone)]
pub struct HtmlSource {
    /// Page address; also the source name and the disk cache key
    url: String,
    /// Kind of item this page yields
    kind: ContentKind,
    selectors: SourceSelectors,
    /// Upper bound on items taken from one page
    max_items: usize,
    client: Client,
    /// Last good result per page, used when a fetch fails
    cache: Option<CacheManager>,
}

impl HtmlSource {
    /// Creates a source, validating its selectors up front
    ///
    /// # Arguments
    /// * `url` - Page to fetch
    /// * `kind` - Kind of item the page yields
    /// * `selectors` - Where items live on the page
    /// * `client` - Shared HTTP client; its timeout bounds each fetch
    ///
    /// # Returns
    /// * `Err(FetchError::InvalidSelector)` if any selector fails to parse
    pub fn new(
        url: impl Into<String>,
        kind: ContentKind,
        selectors: SourceSelectors,
        client: Client,
    ) -> Result<Self, FetchError> {
        parse_selector(&selectors.item)?;
        if let Some(text) = &selectors.text {
            parse_selector(text)?;
        }
        if let Some(author) = &selectors.author {
            parse_selector(author)?;
        }

        Ok(Self {
            url: url.into(),
            kind,
            selectors,
            max_items: DEFAULT_MAX_ITEMS,
            client,
            cache: None,
        })
    }

    /// Keeps the last good result on disk so a failing page still yields items
    ///
    /// The cache never short-circuits a fetch; it is read only after one fails.
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn read_cache(&self) -> Option<(Vec<Item>, bool)> {
        let cache = self.cache.clone()?;
        let key = self.url.clone();
        let cached = tokio::task::spawn_blocking(move || cache.read::<Vec<Item>>(&key))
            .await
            .ok()??;
        Some((cached.data, cached.is_expired))
    }

    async fn write_cache(&self, items: &[Item]) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let key = self.url.clone();
        let items = items.to_vec();
        let written =
            tokio::task::spawn_blocking(move || cache.write(&key, &items, CACHE_TTL_HOURS)).await;
        match written {
            Ok(Ok(())) => debug!(source = %self.url, "Disk cache updated"),
            Ok(Err(e)) => warn!(source = %self.url, error = %e, "Failed to write disk cache"),
            Err(e) => warn!(source = %self.url, error = %e, "Disk cache write task failed"),
        }
    }

    async fn fetch_from_site(&self) -> Result<Vec<Item>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }
        let body = response.text().await?;
        parse_items(&body, self.kind, &self.selectors, self.max_items)
    }
}

#[async_trait]
impl ContentSource for HtmlSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> ContentKind {
        self.kind
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, FetchError> {
        match self.fetch_from_site().await {
            Ok(items) => {
                if !items.is_empty() {
                    self.write_cache(&items).await;
                }
                Ok(items)
            }
            Err(e) => match self.read_cache().await {
                Some((cached, is_expired)) => {
                    warn!(
                        source = %self.url,
                        error = %e,
                        expired = is_expired,
                        "Fetch failed, serving disk cache"
                    );
                    Ok(cached)
                }
                None => Err(e),
            },
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|_| FetchError::InvalidSelector(selector.to_string()))
}

/// Collapses whitespace and strips wrapping quotation marks
fn clean_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, '"' | '\u{201c}' | '\u{201d}' | '\u{2015}' | '\u{2014}') || c.is_whitespace())
        .to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Extracts up to `max_items` items from an HTML document
///
/// Quotes without an author are skipped; good deeds don't need one.
pub fn parse_items(
    html: &str,
    kind: ContentKind,
    selectors: &SourceSelectors,
    max_items: usize,
) -> Result<Vec<Item>, FetchError> {
    let item_selector = parse_selector(&selectors.item)?;
    let text_selector = selectors.text.as_deref().map(parse_selector).transpose()?;
    let author_selector = selectors.author.as_deref().map(parse_selector).transpose()?;

    let theme = match kind {
        ContentKind::Quotes => Theme::Spiritual,
        ContentKind::GoodDeeds => Theme::Kindness,
    };

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for element in document.select(&item_selector).take(max_items) {
        let text = match &text_selector {
            Some(selector) => element.select(selector).next().map(element_text),
            None => Some(element_text(element)),
        };
        let author = author_selector
            .as_ref()
            .and_then(|selector| element.select(selector).next())
            .map(element_text)
            .filter(|a| !a.is_empty());

        if kind == ContentKind::Quotes && author.is_none() {
            continue;
        }
        let Some(Ok(mut item)) = text.map(|t| Item::new(t, theme)) else {
            continue;
        };
        if let Some(author) = author {
            item = item.with_author(author);
        }
        items.push(item);
    }

    Ok(items)
}

/// The pages scraped by default
///
/// Quote pages share the markup `div.quote > span.text + span.author`.
pub fn default_sources(
    client: &Client,
    cache: Option<&CacheManager>,
) -> Result<Vec<Arc<dyn ContentSource>>, FetchError> {
    let quote_selectors = SourceSelectors::new("div.quote", Some("span.text"), Some("span.author"));
    let pages = [
        (
            "https://www.brainyquote.com/topics/spiritual-quotes",
            ContentKind::Quotes,
            quote_selectors.clone(),
        ),
        (
            "https://www.goodreads.com/quotes/tag/spirituality",
            ContentKind::Quotes,
            quote_selectors.clone(),
        ),
        (
            "https://www.azquotes.com/quotes/topics/spiritual.html",
            ContentKind::Quotes,
            quote_selectors,
        ),
        (
            "https://www.randomactsofkindness.org/kindness-ideas",
            ContentKind::GoodDeeds,
            SourceSelectors::new("div.kindness-idea", Some("h3"), None),
        ),
        (
            "https://www.helpguide.org/articles/healthy-living/volunteering-and-its-surprising-benefits.htm",
            ContentKind::GoodDeeds,
            SourceSelectors::new("article li", None, None),
        ),
    ];

    let mut sources: Vec<Arc<dyn ContentSource>> = Vec::with_capacity(pages.len());
    for (url, kind, selectors) in pages {
        let mut source = HtmlSource::new(url, kind, selectors, client.clone())?;
        if let Some(cache) = cache {
            source = source.with_cache(cache.clone());
        }
        sources.push(Arc::new(source));
    }
    Ok(sources)
}
