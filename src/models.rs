//! Data models for raw signals and the entities they accumulate into.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawMention`]: One observation of an entity by one source for one keyword
//! - [`EntityRecord`]: The deduplicated accumulation of every mention of an entity
//! - [`RankedEntity`]: A record after scoring, with its rank and [`Tier`]
//! - [`RunSummary`]: Per-run statistics written next to the CSV reports

use serde::{Deserialize, Serialize};

/// The kind of entity a mention refers to.
///
/// Each kind gets its own aggregation, scoring policy and report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A company posting jobs.
    Company,
    /// A person posting on a social platform or forum.
    Person,
    /// A publisher whose feed carries matching articles.
    Publisher,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Company, Self::Person, Self::Publisher];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Person => "people",
            Self::Publisher => "publishers",
        }
    }
}

/// A single piece of supporting evidence: a job posting, a post or an article.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// Job title, post title or article headline.
    pub title: String,
    /// Link to the posting, post or article.
    pub url: Option<String>,
    /// Engagement metric attached to the item (upvotes, score).
    pub metric: Option<i64>,
    /// Publication or creation time as reported by the source.
    pub published: Option<String>,
}

impl Evidence {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// One observed occurrence of an entity from one source for one search keyword.
///
/// Mentions are what source adapters hand to the core. They are consumed by
/// the aggregator and never outlive a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMention {
    pub kind: EntityKind,
    /// The entity name exactly as the source printed it.
    pub entity: String,
    /// Source name, e.g. `"Indeed"` or `"Reddit"`.
    pub source: String,
    /// Category (hiring) or topic (conversation) the keyword belongs to.
    pub category: String,
    /// The keyword whose search produced this mention.
    pub keyword: String,
    /// Job count or engagement. Missing or negative values count as zero.
    pub weight: Option<i64>,
    /// URL of the entity itself, such as a publisher homepage.
    pub entity_url: Option<String>,
    pub evidence: Option<Evidence>,
}

impl RawMention {
    pub fn new(
        kind: EntityKind,
        entity: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity: entity.into(),
            source: source.into(),
            category: category.into(),
            keyword: keyword.into(),
            weight: None,
            entity_url: None,
            evidence: None,
        }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_entity_url(mut self, url: impl Into<String>) -> Self {
        self.entity_url = Some(url.into());
        self
    }

    /// Signed weight as accumulated by the aggregator; a missing weight adds nothing.
    pub fn weight_or_zero(&self) -> i64 {
        self.weight.unwrap_or(0)
    }
}

/// The accumulated, deduplicated record for one logical entity.
///
/// Categories and sources behave as sets that remember insertion order, so
/// reports can show "the first five categories" deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    pub kind: EntityKind,
    /// Display name taken from the first mention seen.
    pub name: String,
    pub categories: Vec<String>,
    pub sources: Vec<String>,
    /// Every piece of evidence, in arrival order. Reports truncate.
    pub evidence: Vec<Evidence>,
    /// Running signed total of job counts or engagement.
    pub total_weight: i64,
    /// First entity URL any mention supplied.
    pub url: Option<String>,
}

impl EntityRecord {
    /// The accumulated weight, with a negative total counted as zero.
    pub fn scored_weight(&self) -> u64 {
        self.total_weight.max(0) as u64
    }
}

/// Categorical signal strength derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Tier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

/// An [`EntityRecord`] after ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntity {
    /// 1-based position in the capped ranking.
    pub rank: usize,
    pub score: u64,
    pub tier: Tier,
    pub record: EntityRecord,
}

/// Statistics for one entity kind within a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KindSummary {
    pub mentions: usize,
    pub dropped_mentions: usize,
    pub unique_entities: usize,
    pub ranked: usize,
    pub failed_source_calls: usize,
    pub tiers: Vec<(String, usize)>,
    pub output_file: Option<String>,
}

/// Everything written to `run_summary.json` at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub mode: String,
    pub elapsed_secs: f64,
    pub companies: KindSummary,
    pub people: KindSummary,
    pub publishers: KindSummary,
}
