//! Cybersecurity publisher feeds (RSS 2.0 and Atom).
//!
//! Feeds are fetched once per run, on the first search, and cached. Every
//! later keyword is matched against the cached entries. An entry matches when
//! the keyword appears, case-insensitively, in its title or summary. Only the
//! first `max_items` entries of each feed are considered.
//!
//! A feed that cannot be fetched or parsed is logged and left out of the cache.

use super::{SearchQuery, SourceAdapter, unavailable};
use crate::config::PublisherFeed;
use crate::error::{FetchError, SourceUnavailable};
use crate::http::HttpClient;
use crate::models::{EntityKind, Evidence, RawMention};
use async_trait::async_trait;
use futures::future::join_all;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const SOURCE_NAME: &str = "RSS";

/// One feed entry, independent of the feed format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: String,
}

impl FeedEntry {
    fn matches(&self, keyword_lower: &str) -> bool {
        self.title.to_lowercase().contains(keyword_lower)
            || self.summary.to_lowercase().contains(keyword_lower)
    }
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct AtomDocument {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: AtomText,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
}

impl From<RssItem> for FeedEntry {
    fn from(item: RssItem) -> Self {
        Self {
            title: item.title.trim().to_string(),
            link: item.link.map(|l| l.trim().to_string()),
            published: item.pub_date,
            summary: item.description,
        }
    }
}

impl From<AtomEntry> for FeedEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone());
        Self {
            title: entry.title.value.trim().to_string(),
            link,
            published: entry.published.or(entry.updated),
            summary: entry.summary.or(entry.content).map(|t| t.value).unwrap_or_default(),
        }
    }
}

/// Local name of the document's root element.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parse an RSS 2.0 or Atom document, keeping at most `max_items` entries.
pub fn parse_feed(xml: &str, max_items: usize) -> Result<Vec<FeedEntry>, FetchError> {
    let decode = |e: quick_xml::de::DeError| FetchError::Decode(e.to_string());
    let entries: Vec<FeedEntry> = match root_element(xml).as_deref() {
        Some("rss") => {
            let doc: RssDocument = quick_xml::de::from_str(xml).map_err(decode)?;
            doc.channel.items.into_iter().map(FeedEntry::from).collect()
        }
        Some("feed") => {
            let doc: AtomDocument = quick_xml::de::from_str(xml).map_err(decode)?;
            doc.entries.into_iter().map(FeedEntry::from).collect()
        }
        other => {
            return Err(FetchError::Decode(format!(
                "unsupported feed root element {:?}",
                other.unwrap_or("")
            )));
        }
    };
    Ok(entries.into_iter().take(max_items).collect())
}

/// A publisher together with the entries read from its feed.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub publisher: PublisherFeed,
    pub entries: Vec<FeedEntry>,
}

/// Publisher mentions for every cached entry matching the query keyword.
pub fn match_feeds(feeds: &[FetchedFeed], query: &SearchQuery) -> Vec<RawMention> {
    let keyword = query.keyword.to_lowercase();
    feeds
        .iter()
        .flat_map(|feed| {
            feed.entries
                .iter()
                .filter(|entry| entry.matches(&keyword))
                .map(|entry| {
                    RawMention::new(
                        EntityKind::Publisher,
                        &feed.publisher.name,
                        SOURCE_NAME,
                        &query.category,
                        &query.keyword,
                    )
                    .with_weight(1)
                    .with_entity_url(&feed.publisher.url)
                    .with_evidence(Evidence {
                        title: entry.title.clone(),
                        url: entry.link.clone(),
                        metric: None,
                        published: entry.published.clone(),
                    })
                })
        })
        .collect()
}

#[derive(Debug)]
struct FeedCache {
    feeds: Vec<FetchedFeed>,
    failed: usize,
}

#[derive(Debug)]
pub struct PublisherFeeds {
    client: Arc<HttpClient>,
    publishers: Vec<PublisherFeed>,
    max_items: usize,
    cache: OnceCell<FeedCache>,
}

impl PublisherFeeds {
    pub fn new(client: Arc<HttpClient>, publishers: Vec<PublisherFeed>, max_items: usize) -> Self {
        Self {
            client,
            publishers,
            max_items,
            cache: OnceCell::new(),
        }
    }

    async fn fetch_one(&self, publisher: &PublisherFeed) -> Result<FetchedFeed, FetchError> {
        let url = Url::parse(&publisher.rss).map_err(|e| FetchError::Decode(e.to_string()))?;
        let xml = self.client.get_text(&url).await?;
        let entries = parse_feed(&xml, self.max_items)?;
        Ok(FetchedFeed {
            publisher: publisher.clone(),
            entries,
        })
    }

    #[instrument(level = "info", skip_all, fields(publishers = self.publishers.len()))]
    async fn fetch_all(&self) -> FeedCache {
        let results = join_all(self.publishers.iter().map(|p| self.fetch_one(p))).await;

        let mut feeds = Vec::with_capacity(results.len());
        let mut failed = 0usize;
        for (publisher, result) in self.publishers.iter().zip(results) {
            match result {
                Ok(feed) => {
                    debug!(publisher = %publisher.name, entries = feed.entries.len(), "Feed cached");
                    feeds.push(feed);
                }
                Err(e) => {
                    warn!(publisher = %publisher.name, error = %e, "Error reading feed; skipping");
                    failed += 1;
                }
            }
        }
        info!(cached = feeds.len(), failed, "Publisher feeds fetched");
        FeedCache { feeds, failed }
    }
}

#[async_trait]
impl SourceAdapter for PublisherFeeds {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Publisher
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawMention>, SourceUnavailable> {
        let cache = self.cache.get_or_init(|| self.fetch_all()).await;
        if cache.feeds.is_empty() && cache.failed > 0 {
            return Err(unavailable(
                SOURCE_NAME,
                FetchError::Decode(format!("all {} publisher feeds failed", cache.failed)),
            ));
        }
        let mentions = match_feeds(&cache.feeds, query);
        debug!(count = mentions.len(), "Feed entries matched");
        Ok(mentions)
    }
}
