//! LinkedIn job search scraper.
//!
//! LinkedIn's public job search is served to logged-out visitors through the
//! guest endpoint `jobs-guest/jobs/api/seeMoreJobPostings/search`, which
//! returns a fragment of result cards. No account or API key is involved.
//!
//! # Selectors
//!
//! | Field | Selector |
//! |-------|----------|
//! | Card | `div.base-search-card` |
//! | Company | `h4.base-search-card__subtitle` |
//! | Title | `h3.base-search-card__title` |
//! | Link | `a.base-card__full-link` |

use super::{JobCard, SearchQuery, SourceAdapter, cards_to_mentions, element_text, unavailable};
use crate::config::JobBoardSettings;
use crate::error::SourceUnavailable;
use crate::http::HttpClient;
use crate::models::{EntityKind, RawMention};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{info, instrument};
use url::Url;

pub const SOURCE_NAME: &str = "LinkedIn";
pub const DEFAULT_BASE_URL: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";

/// Extract up to `max_cards` job cards from a guest search fragment.
pub fn parse_job_cards(html: &str, max_cards: usize) -> Vec<JobCard> {
    let card_selector = Selector::parse("div.base-search-card").unwrap();
    let company_selector = Selector::parse("h4.base-search-card__subtitle").unwrap();
    let title_selector = Selector::parse("h3.base-search-card__title").unwrap();
    let link_selector = Selector::parse("a.base-card__full-link[href]").unwrap();

    let fragment = Html::parse_fragment(html);
    fragment
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
                .map(|href| href.split('?').next().unwrap_or(href).to_string());
            Some(JobCard { company, title, link })
        })
        .collect()
}

#[derive(Debug)]
pub struct LinkedInJobs {
    client: Arc<HttpClient>,
    settings: JobBoardSettings,
}

impl LinkedInJobs {
    pub fn new(client: Arc<HttpClient>, settings: JobBoardSettings) -> Self {
        Self { client, settings }
    }

    fn search_url(&self, keyword: &str) -> Result<Url, url::ParseError> {
        let base = self.settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse_with_params(
            base,
            &[
                ("keywords", keyword),
                ("location", self.settings.location.as_str()),
                ("start", "0"),
            ],
        )
    }
}

#[async_trait]
impl SourceAdapter for LinkedInJobs {
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

        let cards = parse_job_cards(&html, self.settings.max_results);
        info!(count = cards.len(), "Parsed LinkedIn job cards");
        Ok(cards_to_mentions(SOURCE_NAME, cards, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUEST_FRAGMENT: &str = r#"
        <li>
          <div class="base-card base-search-card job-search-card">
            <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/ai-security-engineer-123?refId=abc"></a>
            <div class="base-search-card__info">
              <h3 class="base-search-card__title">
                AI Security Engineer
              </h3>
              <h4 class="base-search-card__subtitle">
                <a href="https://www.linkedin.com/company/acme">Acme, LLC</a>
              </h4>
            </div>
          </div>
        </li>
        <li>
          <div class="base-card base-search-card job-search-card">
            <div class="base-search-card__info">
              <h3 class="base-search-card__title">Missing Company</h3>
            </div>
          </div>
        </li>
    "#;

    #[test]
    fn test_parse_guest_fragment() {
        let cards = parse_job_cards(GUEST_FRAGMENT, 50);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].company, "Acme, LLC");
        assert_eq!(cards[0].title.as_deref(), Some("AI Security Engineer"));
        assert_eq!(
            cards[0].link.as_deref(),
            Some("https://www.linkedin.com/jobs/view/ai-security-engineer-123")
        );
    }

    #[test]
    fn test_guest_cards_merge_with_other_legal_forms() {
        let query = SearchQuery::new("ai_agent_security", "AI security engineer");
        let mentions = cards_to_mentions(SOURCE_NAME, parse_job_cards(GUEST_FRAGMENT, 50), &query);
        assert_eq!(mentions.len(), 1);
        assert_eq!(
            crate::aggregate::identity_key(&mentions[0].entity),
            crate::aggregate::identity_key("ACME Inc.")
        );
    }

    #[test]
    fn test_search_url_params() {
        let client = Arc::new(HttpClient::from_settings(&Default::default()).unwrap());
        let adapter = LinkedInJobs::new(client, JobBoardSettings::default());
        let url = adapter.search_url("GenAI security").unwrap();
        assert_eq!(url.path(), "/jobs-guest/jobs/api/seeMoreJobPostings/search");
        assert!(url.as_str().contains("keywords=GenAI+security"));
    }
}
