//! Source adapters that turn public pages, APIs and feeds into [`RawMention`]s.
//!
//! Every adapter implements [`SourceAdapter`]: given one category and one
//! keyword, it returns the mentions it found, or [`SourceUnavailable`] when
//! the source could not be queried. The orchestrator logs and skips failures,
//! so a single broken source never aborts a run.
//!
//! # Supported Sources
//!
//! | Source | Module | Entity | Method | Notes |
//! |--------|--------|--------|--------|-------|
//! | Indeed | [`indeed`] | Company | HTML scraping | One mention per job card |
//! | LinkedIn | [`linkedin`] | Company | HTML scraping | Public guest job search endpoint |
//! | Reddit | [`reddit`] | Person | JSON search | Per-subreddit search, weight = post score |
//! | Publisher feeds | [`publishers`] | Publisher | RSS / Atom | Feeds fetched once per run |
//! | Sample | [`sample`] | All | Synthetic | Seeded, offline, for demos and dry runs |
//!
//! X/Twitter needs authenticated API access and has no adapter.

use crate::config::TrackerConfig;
use crate::error::{FetchError, SourceUnavailable};
use crate::http::HttpClient;
use crate::models::{EntityKind, Evidence, RawMention};
use async_trait::async_trait;
use itertools::Itertools;
use scraper::ElementRef;
use std::sync::Arc;
use std::time::Duration;

pub mod indeed;
pub mod linkedin;
pub mod publishers;
pub mod reddit;
pub mod sample;

/// One search: a keyword and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub category: String,
    pub keyword: String,
}

impl SearchQuery {
    pub fn new(category: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            keyword: keyword.into(),
        }
    }
}

/// A source of raw entity mentions.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source name recorded on every mention, e.g. `"Indeed"`.
    fn name(&self) -> &str;

    /// The kind of entity this source reports.
    fn kind(&self) -> EntityKind;

    /// Search the source for one keyword.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawMention>, SourceUnavailable>;
}

pub type BoxedAdapter = Box<dyn SourceAdapter>;

/// A job posting read from a job board results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    pub company: String,
    pub title: Option<String>,
    pub link: Option<String>,
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Turn parsed job cards into company mentions for one query.
///
/// Each card counts as one job; its title becomes the evidence.
pub fn cards_to_mentions(source: &str, cards: Vec<JobCard>, query: &SearchQuery) -> Vec<RawMention> {
    cards
        .into_iter()
        .map(|card| {
            let mut mention = RawMention::new(
                EntityKind::Company,
                card.company,
                source,
                &query.category,
                &query.keyword,
            )
            .with_weight(1);
            if let Some(title) = card.title {
                mention = mention.with_evidence(Evidence {
                    title,
                    url: card.link,
                    metric: None,
                    published: None,
                });
            }
            mention
        })
        .collect()
}

pub(crate) fn unavailable(source: &str, err: FetchError) -> SourceUnavailable {
    SourceUnavailable::new(source, err)
}

/// Build the live adapters enabled in the configuration.
pub fn live_adapters(config: &TrackerConfig, client: HttpClient) -> Vec<BoxedAdapter> {
    let client = Arc::new(client);
    let mut adapters: Vec<BoxedAdapter> = Vec::new();

    if config.job_boards.indeed.enabled {
        adapters.push(Box::new(indeed::IndeedJobs::new(
            Arc::clone(&client),
            config.job_boards.indeed.clone(),
        )));
    }
    if config.job_boards.linkedin.enabled {
        adapters.push(Box::new(linkedin::LinkedInJobs::new(
            Arc::clone(&client),
            config.job_boards.linkedin.clone(),
        )));
    }
    if config.reddit.enabled {
        adapters.push(Box::new(
            reddit::RedditSearch::new(Arc::clone(&client), config.reddit.clone())
                .with_delay(Duration::from_millis(config.http.request_delay_ms)),
        ));
    }
    if config.feeds.enabled && !config.publishers.is_empty() {
        adapters.push(Box::new(publishers::PublisherFeeds::new(
            Arc::clone(&client),
            config.publishers.clone(),
            config.feeds.max_items,
        )));
    }
    adapters
}

/// Build one offline sample adapter per entity kind.
pub fn sample_adapters(config: &TrackerConfig, seed: u64) -> Vec<BoxedAdapter> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| {
            let source = sample::SampleSource::new(kind, seed).with_publishers(&config.publishers);
            Box::new(source) as BoxedAdapter
        })
        .collect()
}
