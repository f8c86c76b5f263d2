//! Reddit discussion search.
//!
//! Uses the public `search.json` listing of each configured subreddit,
//! restricted to that subreddit and to the configured time window. Every post
//! becomes a mention of its author, weighted by the post's score.
//!
//! Subreddits are queried one after another with the configured request
//! delay between them. A subreddit that fails is logged and skipped; the
//! search as a whole only fails when no subreddit could be queried.

use super::{SearchQuery, SourceAdapter};
use crate::config::RedditSettings;
use crate::error::SourceUnavailable;
use crate::http::HttpClient;
use crate::models::{EntityKind, Evidence, RawMention};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use url::Url;

pub const SOURCE_NAME: &str = "Reddit";

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub struct Child {
    pub data: Post,
}

#[derive(Debug, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub permalink: String,
    pub created_utc: Option<f64>,
}

impl Post {
    fn has_author(&self) -> bool {
        let author = self.author.trim();
        !author.is_empty() && author != "[deleted]"
    }
}

/// Turn a search listing into person mentions for one query.
pub fn listing_to_mentions(listing: Listing, base: &Url, query: &SearchQuery) -> Vec<RawMention> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(Post::has_author)
        .map(|post| {
            let url = base.join(&post.permalink).ok().map(|u| u.to_string());
            let published = post
                .created_utc
                .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
                .map(|t| t.to_rfc3339());
            RawMention::new(
                EntityKind::Person,
                post.author,
                SOURCE_NAME,
                &query.category,
                &query.keyword,
            )
            .with_weight(post.score)
            .with_evidence(Evidence {
                title: post.title,
                url,
                metric: Some(post.score),
                published,
            })
        })
        .collect()
}

#[derive(Debug)]
pub struct RedditSearch {
    client: Arc<HttpClient>,
    settings: RedditSettings,
    delay: Duration,
}

impl RedditSearch {
    pub fn new(client: Arc<HttpClient>, settings: RedditSettings) -> Self {
        Self {
            client,
            settings,
            delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive subreddit requests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.settings.base_url)
    }

    fn search_url(&self, subreddit: &str, keyword: &str) -> Result<Url, url::ParseError> {
        let limit = self.settings.max_results.to_string();
        let endpoint = self.base()?.join(&format!("r/{subreddit}/search.json"))?;
        Url::parse_with_params(
            endpoint.as_str(),
            &[
                ("q", keyword),
                ("restrict_sr", "1"),
                ("t", self.settings.time_range.as_str()),
                ("limit", limit.as_str()),
                ("sort", "new"),
            ],
        )
    }
}

#[async_trait]
impl SourceAdapter for RedditSearch {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Person
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawMention>, SourceUnavailable> {
        let base = self.base().map_err(|e| SourceUnavailable::new(SOURCE_NAME, e))?;
        let mut mentions = Vec::new();
        let mut failures = 0usize;
        let mut last_error = String::new();

        for (i, subreddit) in self.settings.subreddits.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            let url = match self.search_url(subreddit, &query.keyword) {
                Ok(url) => url,
                Err(e) => {
                    warn!(%subreddit, error = %e, "Invalid subreddit search URL; skipping");
                    failures += 1;
                    last_error = e.to_string();
                    continue;
                }
            };
            match self.client.get_json::<Listing>(&url).await {
                Ok(listing) => {
                    let found = listing_to_mentions(listing, &base, query);
                    info!(%subreddit, count = found.len(), "Reddit posts matched");
                    mentions.extend(found);
                }
                Err(e) => {
                    warn!(%subreddit, error = %e, "Error searching subreddit; skipping");
                    failures += 1;
                    last_error = e.to_string();
                }
            }
        }

        if failures > 0 && failures == self.settings.subreddits.len() {
            return Err(SourceUnavailable::new(
                SOURCE_NAME,
                format!("all {failures} subreddits failed, last error: {last_error}"),
            ));
        }
        Ok(mentions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": null,
            "children": [
                {"kind": "t3", "data": {
                    "author": "cloudsecpro",
                    "title": "SSPM best practices for 2025",
                    "score": 412,
                    "permalink": "/r/cybersecurity/comments/abc/sspm_best_practices/",
                    "created_utc": 1735689600.0
                }},
                {"kind": "t3", "data": {
                    "author": "[deleted]",
                    "title": "removed",
                    "score": 3,
                    "permalink": "/r/cybersecurity/comments/def/removed/",
                    "created_utc": 1735689700.0
                }},
                {"kind": "t3", "data": {
                    "author": "grumpy_admin",
                    "title": "Is SSPM just CSPM for SaaS?",
                    "score": -4,
                    "permalink": "/r/sysadmin/comments/ghi/is_sspm/"
                }}
            ]
        }
    }"#;

    fn base() -> Url {
        Url::parse("https://www.reddit.com").unwrap()
    }

    #[test]
    fn test_listing_to_mentions() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let query = SearchQuery::new("sspm", "SSPM");
        let mentions = listing_to_mentions(listing, &base(), &query);

        assert_eq!(mentions.len(), 2);
        let first = &mentions[0];
        assert_eq!(first.entity, "cloudsecpro");
        assert_eq!(first.kind, EntityKind::Person);
        assert_eq!(first.weight, Some(412));
        let evidence = first.evidence.as_ref().unwrap();
        assert_eq!(evidence.metric, Some(412));
        assert_eq!(
            evidence.url.as_deref(),
            Some("https://www.reddit.com/r/cybersecurity/comments/abc/sspm_best_practices/")
        );
        assert_eq!(evidence.published.as_deref(), Some("2025-01-01T00:00:00+00:00"));

        // Negative score is kept on the mention as is.
        assert_eq!(mentions[1].weight, Some(-4));
        assert_eq!(mentions[1].evidence.as_ref().unwrap().metric, Some(-4));
        assert_eq!(mentions[1].evidence.as_ref().unwrap().published, None);
    }

    #[test]
    fn test_empty_listing() {
        let listing: Listing = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        let mentions = listing_to_mentions(listing, &base(), &SearchQuery::new("sspm", "SSPM"));
        assert!(mentions.is_empty());
    }

    #[test]
    fn test_search_url() {
        let client = Arc::new(HttpClient::from_settings(&Default::default()).unwrap());
        let adapter = RedditSearch::new(client, RedditSettings::default());
        let url = adapter.search_url("netsec", "AI agent security").unwrap();
        assert_eq!(url.path(), "/r/netsec/search.json");
        let query = url.query().unwrap();
        assert!(query.contains("q=AI+agent+security"));
        assert!(query.contains("restrict_sr=1"));
        assert!(query.contains("t=week"));
        assert!(query.contains("limit=25"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subreddit_requests_are_spaced_by_delay() {
        let client = Arc::new(HttpClient::from_settings(&Default::default()).unwrap());
        // A base that cannot be joined fails every subreddit without touching the network.
        let settings = RedditSettings {
            base_url: "mailto:nobody@example.com".to_string(),
            subreddits: vec!["cybersecurity".to_string(), "netsec".to_string(), "sysadmin".to_string()],
            ..RedditSettings::default()
        };
        let adapter = RedditSearch::new(client, settings).with_delay(Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        let result = adapter.search(&SearchQuery::new("sspm", "SSPM")).await;

        assert!(result.is_err());
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }
}
