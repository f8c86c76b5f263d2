//! Scoring and ranking of accumulated entity records.
//!
//! Each entity kind carries its own [`ScoringPolicy`]: a linear score over the
//! record's weight, category count, source count and evidence count, and a
//! set of tier thresholds applied to that score.
//!
//! | Kind | Score | Tiers (Very High / High / Medium) |
//! |------|-------|-----------------------------------|
//! | Company | `jobs * 10 + categories * 5 + sources * 3` | 100 / 50 / 20 |
//! | Person | `engagement` | 1000 / 500 / 100 |
//! | Publisher | `articles` | 100 / 50 / 20 |
//!
//! Engagement and job-derived scores live on different scales, which is why
//! thresholds are per kind and overridable from configuration.

use crate::models::{EntityKind, EntityRecord, RankedEntity, Tier};
use serde::{Deserialize, Serialize};

/// Coefficients of the linear score formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub per_weight: u64,
    pub per_category: u64,
    pub per_source: u64,
    pub per_evidence: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            per_weight: 1,
            per_category: 0,
            per_source: 0,
            per_evidence: 0,
        }
    }
}

impl ScoreWeights {
    /// Linear score of a record. A negative accumulated weight counts as zero.
    pub fn score(&self, record: &EntityRecord) -> u64 {
        let weighted = |count: u64, coefficient: u64| count.saturating_mul(coefficient);
        weighted(record.scored_weight(), self.per_weight)
            .saturating_add(weighted(record.categories.len() as u64, self.per_category))
            .saturating_add(weighted(record.sources.len() as u64, self.per_source))
            .saturating_add(weighted(record.evidence.len() as u64, self.per_evidence))
    }
}

/// Minimum scores for each tier above [`Tier::Low`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub very_high: u64,
    pub high: u64,
    pub medium: u64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            very_high: 100,
            high: 50,
            medium: 20,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, score: u64) -> Tier {
        if score >= self.very_high {
            Tier::VeryHigh
        } else if score >= self.high {
            Tier::High
        } else if score >= self.medium {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    /// Thresholds must not decrease from `very_high` down to `medium`.
    pub fn is_ordered(&self) -> bool {
        self.very_high >= self.high && self.high >= self.medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub weights: ScoreWeights,
    pub tiers: TierThresholds,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::for_kind(EntityKind::Company)
    }
}

impl ScoringPolicy {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Company => Self {
                weights: ScoreWeights {
                    per_weight: 10,
                    per_category: 5,
                    per_source: 3,
                    per_evidence: 0,
                },
                tiers: TierThresholds::default(),
            },
            EntityKind::Person => Self {
                weights: ScoreWeights::default(),
                tiers: TierThresholds {
                    very_high: 1000,
                    high: 500,
                    medium: 100,
                },
            },
            EntityKind::Publisher => Self {
                weights: ScoreWeights {
                    per_weight: 0,
                    per_category: 0,
                    per_source: 0,
                    per_evidence: 1,
                },
                tiers: TierThresholds::default(),
            },
        }
    }

    /// Linear score of a record. A negative accumulated weight counts as zero.
    pub fn score(&self, record: &EntityRecord) -> u64 {
        self.weights.score(record)
    }

    pub fn tier(&self, score: u64) -> Tier {
        self.tiers.classify(score)
    }
}

/// Score, sort and cap a set of records.
///
/// Records are sorted by descending score with a stable sort, so entities with
/// equal scores keep the order they arrived in. Only the first `limit`
/// entities are returned; their ranks run from 1 to `limit` without gaps.
pub fn rank<I>(records: I, policy: &ScoringPolicy, limit: usize) -> Vec<RankedEntity>
where
    I: IntoIterator<Item = EntityRecord>,
{
    let mut scored: Vec<(u64, EntityRecord)> = records
        .into_iter()
        .map(|record| (policy.score(&record), record))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, record))| RankedEntity {
            rank: i + 1,
            score,
            tier: policy.tier(score),
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Evidence;

    fn company(name: &str, jobs: i64, categories: &[&str], sources: &[&str]) -> EntityRecord {
        EntityRecord {
            kind: EntityKind::Company,
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            evidence: vec![],
            total_weight: jobs,
            url: None,
        }
    }

    #[test]
    fn test_company_score_example() {
        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let acme = company("Acme Inc", 8, &["sspm", "ai_compliance"], &[]);
        assert_eq!(policy.score(&acme), 90);
        assert_eq!(policy.tier(90), Tier::High);

        let with_source = company("Acme Inc", 8, &["sspm", "ai_compliance"], &["Indeed"]);
        assert_eq!(policy.score(&with_source), 93);
    }

    #[test]
    fn test_tier_boundaries() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.classify(0), Tier::Low);
        assert_eq!(tiers.classify(19), Tier::Low);
        assert_eq!(tiers.classify(20), Tier::Medium);
        assert_eq!(tiers.classify(49), Tier::Medium);
        assert_eq!(tiers.classify(50), Tier::High);
        assert_eq!(tiers.classify(99), Tier::High);
        assert_eq!(tiers.classify(100), Tier::VeryHigh);
    }

    #[test]
    fn test_person_and_publisher_policies() {
        let person = ScoringPolicy::for_kind(EntityKind::Person);
        let mut record = company("@saassec", 640, &["sspm", "salesforce_breach"], &["Reddit"]);
        record.kind = EntityKind::Person;
        assert_eq!(person.score(&record), 640);
        assert_eq!(person.tier(640), Tier::High);
        assert_eq!(person.tier(99), Tier::Low);

        let publisher = ScoringPolicy::for_kind(EntityKind::Publisher);
        record.kind = EntityKind::Publisher;
        record.evidence = vec![Evidence::titled("a"), Evidence::titled("b"), Evidence::titled("c")];
        assert_eq!(publisher.score(&record), 3);
    }

    #[test]
    fn test_negative_total_scores_as_zero_weight() {
        let person = ScoringPolicy::for_kind(EntityKind::Person);
        let mut record = company("grumpy_admin", -40, &["sspm"], &["Reddit"]);
        record.kind = EntityKind::Person;
        assert_eq!(person.score(&record), 0);
        assert_eq!(person.tier(person.score(&record)), Tier::Low);

        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let downvoted = company("Acme", -3, &["sspm"], &["Indeed"]);
        assert_eq!(policy.score(&downvoted), 8);
    }

    #[test]
    fn test_score_is_monotonic_in_jobs() {
        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let mut last_score = 0;
        let mut last_tier = Tier::Low;
        for jobs in 0..40 {
            let record = company("Acme", jobs, &["sspm"], &["Indeed"]);
            let score = policy.score(&record);
            let tier = policy.tier(score);
            assert!(score >= last_score);
            assert!(tier >= last_tier);
            last_score = score;
            last_tier = tier;
        }
    }

    #[test]
    fn test_equal_scores_keep_arrival_order() {
        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let a = company("A", 5, &[], &[]);
        let b = company("B", 5, &[], &[]);
        let ranked = rank(vec![a, b], &policy, 10);

        assert_eq!(ranked[0].record.name, "A");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].score, 50);
        assert_eq!(ranked[1].record.name, "B");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_empty_input_ranks_to_empty() {
        let policy = ScoringPolicy::default();
        assert!(rank(Vec::new(), &policy, 10).is_empty());
    }

    #[test]
    fn test_rank_is_deterministic() {
        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let records: Vec<EntityRecord> = (0..30)
            .map(|i| company(&format!("Co{i}"), (i * 7) % 5, &["sspm"], &["Indeed"]))
            .collect();

        let first = rank(records.clone(), &policy, 12);
        let second = rank(records, &policy, 12);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_cap_returns_top_n() {
        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let records: Vec<EntityRecord> = (0..20)
            .map(|i| company(&format!("Co{i}"), (i * 13) % 17, &["sspm"], &[]))
            .collect();

        let full = rank(records.clone(), &policy, usize::MAX);
        let capped = rank(records, &policy, 5);

        assert_eq!(capped.len(), 5);
        assert_eq!(
            capped.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        for (top, expected) in capped.iter().zip(full.iter()) {
            assert_eq!(top.record.name, expected.record.name);
            assert_eq!(top.score, expected.score);
        }
        let cutoff = capped.last().unwrap().score;
        assert!(full[5..].iter().all(|r| r.score <= cutoff));
    }

    #[test]
    fn test_cap_larger_than_input() {
        let policy = ScoringPolicy::for_kind(EntityKind::Company);
        let ranked = rank(vec![company("Solo", 1, &[], &[])], &policy, 1000);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn test_threshold_ordering_check() {
        assert!(TierThresholds::default().is_ordered());
        let broken = TierThresholds {
            very_high: 10,
            high: 50,
            medium: 20,
        };
        assert!(!broken.is_ordered());
    }
}
