//! Run configuration: keyword catalogs, publishers, source settings, limits
//! and scoring policies.
//!
//! Everything has a default, so the tracker runs without a config file. A
//! YAML file may override any subset of fields:
//!
//! ```yaml
//! hiring_keywords:
//!   sspm: ["SSPM", "SaaS Security Posture Management"]
//! output:
//!   dir: ./reports
//!   companies_limit: 250
//! scoring:
//!   person:
//!     tiers: { very_high: 2000, high: 800, medium: 150 }
//! ```
//!
//! Keyword catalogs are mappings from category name to keywords and keep the
//! order they are declared in.

use crate::error::ConfigError;
use crate::models::EntityKind;
use crate::ranking::{ScoreWeights, ScoringPolicy, TierThresholds};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One category (or topic) and the search keywords that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

fn keyword_catalog<'de, D>(deserializer: D) -> Result<Vec<KeywordGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = serde_yaml::Mapping::deserialize(deserializer)?;
    mapping
        .into_iter()
        .map(|(key, value)| {
            let category = key
                .as_str()
                .ok_or_else(|| D::Error::custom("keyword category names must be strings"))?
                .to_string();
            let keywords: Vec<String> = serde_yaml::from_value(value).map_err(D::Error::custom)?;
            Ok(KeywordGroup { category, keywords })
        })
        .collect()
}

/// A cybersecurity publisher and its feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublisherFeed {
    pub name: String,
    pub url: String,
    pub rss: String,
}

impl PublisherFeed {
    fn new(name: &str, url: &str, rss: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            rss: rss.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobBoardSettings {
    pub enabled: bool,
    /// Search endpoint; each adapter falls back to its own public endpoint.
    pub base_url: Option<String>,
    /// Maximum job cards read per keyword.
    pub max_results: usize,
    pub location: String,
}

impl Default for JobBoardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            max_results: 50,
            location: "United States".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobBoards {
    pub indeed: JobBoardSettings,
    pub linkedin: JobBoardSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub enabled: bool,
    pub base_url: String,
    pub subreddits: Vec<String>,
    /// Posts requested per subreddit and keyword.
    pub max_results: usize,
    /// Reddit search window: hour, day, week, month, year or all.
    pub time_range: String,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.reddit.com".to_string(),
            subreddits: ["cybersecurity", "netsec", "sysadmin", "security", "SaaS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_results: 25,
            time_range: "week".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub enabled: bool,
    /// Only the first `max_items` entries of each feed are matched.
    pub max_items: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub companies_limit: usize,
    pub people_limit: usize,
    pub publishers_limit: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            companies_limit: 1000,
            people_limit: 500,
            publishers_limit: 100,
        }
    }
}

impl OutputSettings {
    pub fn limit(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Company => self.companies_limit,
            EntityKind::Person => self.people_limit,
            EntityKind::Publisher => self.publishers_limit,
        }
    }
}

/// Scoring policies per entity kind.
///
/// A YAML override replaces `weights` or `tiers` of one kind as a whole;
/// whatever it leaves out keeps that kind's own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ScoringOverrides")]
pub struct ScoringSettings {
    pub company: ScoringPolicy,
    pub person: ScoringPolicy,
    pub publisher: ScoringPolicy,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        ScoringOverrides::default().into()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PolicyOverride {
    weights: Option<ScoreWeights>,
    tiers: Option<TierThresholds>,
}

impl PolicyOverride {
    fn apply(self, kind: EntityKind) -> ScoringPolicy {
        let defaults = ScoringPolicy::for_kind(kind);
        ScoringPolicy {
            weights: self.weights.unwrap_or(defaults.weights),
            tiers: self.tiers.unwrap_or(defaults.tiers),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ScoringOverrides {
    company: PolicyOverride,
    person: PolicyOverride,
    publisher: PolicyOverride,
}

impl From<ScoringOverrides> for ScoringSettings {
    fn from(overrides: ScoringOverrides) -> Self {
        Self {
            company: overrides.company.apply(EntityKind::Company),
            person: overrides.person.apply(EntityKind::Person),
            publisher: overrides.publisher.apply(EntityKind::Publisher),
        }
    }
}

impl ScoringSettings {
    pub fn policy(&self, kind: EntityKind) -> &ScoringPolicy {
        match kind {
            EntityKind::Company => &self.company,
            EntityKind::Person => &self.person,
            EntityKind::Publisher => &self.publisher,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Pause between consecutive queries against the same source.
    pub request_delay_ms: u64,
    pub max_retries: usize,
    pub user_agents: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            request_delay_ms: 2000,
            max_retries: 3,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
            ],
        }
    }
}

/// Top-level configuration passed to the pipeline entry point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    #[serde(deserialize_with = "keyword_catalog")]
    pub hiring_keywords: Vec<KeywordGroup>,
    #[serde(deserialize_with = "keyword_catalog")]
    pub conversation_topics: Vec<KeywordGroup>,
    pub publishers: Vec<PublisherFeed>,
    pub job_boards: JobBoards,
    pub reddit: RedditSettings,
    pub feeds: FeedSettings,
    pub output: OutputSettings,
    pub scoring: ScoringSettings,
    pub http: HttpSettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hiring_keywords: default_hiring_keywords(),
            conversation_topics: default_conversation_topics(),
            publishers: default_publishers(),
            job_boards: JobBoards::default(),
            reddit: RedditSettings::default(),
            feeds: FeedSettings::default(),
            output: OutputSettings::default(),
            scoring: ScoringSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a YAML file, or use the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(path = %path.display(), "Loaded configuration file");
                config
            }
            None => {
                info!("No config file given; using built-in defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Keyword catalog searched for a given entity kind.
    pub fn keywords_for(&self, kind: EntityKind) -> &[KeywordGroup] {
        match kind {
            EntityKind::Company => &self.hiring_keywords,
            EntityKind::Person | EntityKind::Publisher => &self.conversation_topics,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hiring_keywords.iter().all(|g| g.keywords.is_empty()) {
            return Err(ConfigError::Invalid("hiring_keywords has no keywords".into()));
        }
        if self.conversation_topics.iter().all(|g| g.keywords.is_empty()) {
            return Err(ConfigError::Invalid("conversation_topics has no keywords".into()));
        }
        for kind in EntityKind::ALL {
            if self.output.limit(kind) == 0 {
                return Err(ConfigError::Invalid(format!(
                    "output limit for {} must be at least 1",
                    kind.label()
                )));
            }
            if !self.scoring.policy(kind).tiers.is_ordered() {
                return Err(ConfigError::Invalid(format!(
                    "tier thresholds for {} must satisfy very_high >= high >= medium",
                    kind.label()
                )));
            }
        }
        if self.http.user_agents.is_empty() {
            return Err(ConfigError::Invalid("http.user_agents must not be empty".into()));
        }
        Ok(())
    }
}

fn default_hiring_keywords() -> Vec<KeywordGroup> {
    vec![
        KeywordGroup::new(
            "saas_security",
            &[
                "SaaS Security",
                "SaaS security engineer",
                "SaaS security analyst",
                "Cloud security engineer",
                "SaaS security architect",
            ],
        ),
        KeywordGroup::new(
            "sspm",
            &[
                "SSPM",
                "SaaS Security Posture Management",
                "SaaS posture",
                "SaaS security posture",
            ],
        ),
        KeywordGroup::new(
            "ai_agent_security",
            &[
                "AI agent security",
                "AI security engineer",
                "GenAI security",
                "AI agent defense",
                "AI security analyst",
            ],
        ),
        KeywordGroup::new(
            "saas_compliance",
            &[
                "SaaS compliance",
                "SaaS compliance engineer",
                "SaaS governance",
                "Cloud compliance",
            ],
        ),
        KeywordGroup::new(
            "ai_compliance",
            &[
                "AI compliance",
                "AI governance",
                "AI compliance engineer",
                "GenAI compliance",
            ],
        ),
    ]
}

fn default_conversation_topics() -> Vec<KeywordGroup> {
    vec![
        KeywordGroup::new(
            "saas_security",
            &[
                "SaaS Security",
                "SaaS security posture",
                "SaaS security management",
                "SaaS security platform",
            ],
        ),
        KeywordGroup::new(
            "sspm",
            &["SSPM", "SaaS Security Posture Management", "SaaS posture management"],
        ),
        KeywordGroup::new(
            "saas_compliance",
            &["SaaS compliance", "SaaS governance", "SaaS regulatory compliance"],
        ),
        KeywordGroup::new(
            "ai_agent_security",
            &[
                "AI agent security",
                "AI agent defense",
                "GenAI security",
                "AI agent threat",
            ],
        ),
        KeywordGroup::new(
            "salesforce_breach",
            &[
                "Salesforce breach",
                "Salesforce data breach",
                "Salesforce security incident",
            ],
        ),
        KeywordGroup::new(
            "gainsight_breach",
            &["Gainsight breach", "Gainsight data breach", "Gainsight security"],
        ),
        KeywordGroup::new(
            "salesloft_breach",
            &[
                "Salesloft breach",
                "Salesloft data breach",
                "Salesloft security incident",
            ],
        ),
    ]
}

fn default_publishers() -> Vec<PublisherFeed> {
    vec![
        PublisherFeed::new(
            "The Hacker News",
            "https://thehackernews.com",
            "https://feeds.feedburner.com/TheHackersNews",
        ),
        PublisherFeed::new(
            "Dark Reading",
            "https://www.darkreading.com",
            "https://www.darkreading.com/rss.xml",
        ),
        PublisherFeed::new(
            "SecurityWeek",
            "https://www.securityweek.com",
            "https://www.securityweek.com/rss",
        ),
        PublisherFeed::new(
            "Krebs on Security",
            "https://krebsonsecurity.com",
            "https://krebsonsecurity.com/feed/",
        ),
        PublisherFeed::new(
            "Bleeping Computer",
            "https://www.bleepingcomputer.com",
            "https://www.bleepingcomputer.com/feed/",
        ),
        PublisherFeed::new(
            "Threatpost",
            "https://threatpost.com",
            "https://threatpost.com/feed/",
        ),
        PublisherFeed::new(
            "CSO Online",
            "https://www.csoonline.com",
            "https://www.csoonline.com/index.rss",
        ),
        PublisherFeed::new(
            "SC Magazine",
            "https://www.scmagazine.com",
            "https://www.scmagazine.com/rss",
        ),
        PublisherFeed::new(
            "InfoSecurity Magazine",
            "https://www.infosecurity-magazine.com",
            "https://www.infosecurity-magazine.com/rss/news/",
        ),
        PublisherFeed::new(
            "Security Boulevard",
            "https://securityboulevard.com",
            "https://securityboulevard.com/feed/",
        ),
    ]
}
