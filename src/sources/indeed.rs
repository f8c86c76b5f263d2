//! Indeed job search scraper.
//!
//! Searches `https://www.indeed.com/jobs?q=<keyword>&l=<location>` and reads
//! the job cards on the first results page. Each card names the hiring
//! company and the job title.
//!
//! # Selectors
//!
//! | Field | Selector |
//! |-------|----------|
//! | Card | `div.job_seen_beacon` |
//! | Company | `span.companyName`, `[data-testid="company-name"]` |
//! | Title | `h2.jobTitle` |
//!
//! Every card becomes one mention with weight 1 and the job title as evidence.

use super::{JobCard, SearchQuery, SourceAdapter, cards_to_mentions, element_text, unavailable};
use crate::config::JobBoardSettings;
use crate::error::SourceUnavailable;
use crate::http::HttpClient;
use crate::models::{EntityKind, RawMention};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

pub const SOURCE_NAME: &str = "Indeed";
pub const DEFAULT_BASE_URL: &str = "https://www.indeed.com/jobs";

/// Extract up to `max_cards` job cards from an Indeed results page.
///
/// Cards without a company name are skipped.
pub fn parse_job_cards(html: &str, base: &Url, max_cards: usize) -> Vec<JobCard> {
    let card_selector = Selector::parse("div.job_seen_beacon").unwrap();
    let company_selector = Selector::parse(r#"span.companyName, [data-testid="company-name"]"#).unwrap();
    let title_selector = Selector::parse("h2.jobTitle").unwrap();
    let link_selector = Selector::parse("h2.jobTitle a[href]").unwrap();

    let document = Html::parse_document(html);
    document
        .select(&card_selector)
        .take(max_cards)
        .filter_map(|card| {
            let company = card.select(&company_selector).next().map(element_text)?;
            if company.is_empty() {
                return None;
            }
            let title = card
                .select(&title_selector)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty());
            let link = card
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| base.join(href).ok())
                .map(|u| u.to_string());
            Some(JobCard { company, title, link })
        })
        .collect()
}

#[derive(Debug)]
pub struct IndeedJobs {
    client: Arc<HttpClient>,
    settings: JobBoardSettings,
}

impl IndeedJobs {
    pub fn new(client: Arc<HttpClient>, settings: JobBoardSettings) -> Self {
        Self { client, settings }
    }

    fn search_url(&self, keyword: &str) -> Result<Url, url::ParseError> {
        let base = self.settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse_with_params(
            base,
            &[("q", keyword), ("l", self.settings.location.as_str()), ("start", "0")],
        )
    }
}

#[async_trait]
impl SourceAdapter for IndeedJobs {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Company
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawMention>, SourceUnavailable> {
        let url = self
            .search_url(&query.keyword)
            .map_err(|e| SourceUnavailable::new(SOURCE_NAME, e))?;
        let html = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| unavailable(SOURCE_NAME, e))?;

        let cards = parse_job_cards(&html, &url, self.settings.max_results);
        debug!(cards = ?cards, "Indeed job cards");
        info!(count = cards.len(), "Parsed Indeed job cards");
        Ok(cards_to_mentions(SOURCE_NAME, cards, query))
    }
}
