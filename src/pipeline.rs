//! Orchestration: query the sources for one entity kind, aggregate what they
//! return and rank the result.
//!
//! Adapters of the same kind run concurrently. Each adapter walks the keyword
//! catalog sequentially, pausing between queries. Mentions are concatenated
//! in adapter order, then keyword order, so first-seen order in the
//! aggregator never depends on network timing.

use crate::aggregate::Aggregator;
use crate::config::KeywordGroup;
use crate::models::{EntityKind, KindSummary, RankedEntity, RawMention, Tier};
use crate::ranking::{ScoringPolicy, rank};
use crate::sources::{BoxedAdapter, SearchQuery, SourceAdapter};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Flatten a keyword catalog into queries, in declaration order.
pub fn queries(groups: &[KeywordGroup]) -> Vec<SearchQuery> {
    groups
        .iter()
        .flat_map(|group| {
            group
                .keywords
                .iter()
                .map(|keyword| SearchQuery::new(&group.category, keyword))
        })
        .collect()
}

/// Everything the sources returned for one entity kind.
#[derive(Debug, Default)]
pub struct Collection {
    pub mentions: Vec<RawMention>,
    /// Adapter calls that failed with `SourceUnavailable`.
    pub failed_calls: usize,
}

async fn walk_keywords(adapter: &dyn SourceAdapter, queries: &[SearchQuery], delay: Duration) -> Collection {
    let mut collection = Collection::default();
    for (i, query) in queries.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay).await;
        }
        match adapter.search(query).await {
            Ok(mentions) => {
                debug!(source = adapter.name(), keyword = %query.keyword, count = mentions.len(), "Source returned mentions");
                collection.mentions.extend(mentions);
            }
            Err(e) => {
                warn!(source = adapter.name(), keyword = %query.keyword, error = %e, "Skipping unavailable source");
                collection.failed_calls += 1;
            }
        }
    }
    collection
}

/// Run every adapter over the keyword catalog and gather their mentions.
#[instrument(level = "info", skip_all)]
pub async fn collect_mentions<'a, I>(adapters: I, groups: &[KeywordGroup], delay: Duration) -> Collection
where
    I: IntoIterator<Item = &'a dyn SourceAdapter>,
{
    let adapters: Vec<&dyn SourceAdapter> = adapters.into_iter().collect();
    let queries = queries(groups);
    debug!(adapters = adapters.len(), queries = queries.len(), "Querying sources");
    let per_adapter = join_all(
        adapters
            .iter()
            .map(|adapter| walk_keywords(*adapter, &queries, delay)),
    )
    .await;

    let mut collection = Collection::default();
    for (adapter, part) in adapters.iter().zip(per_adapter) {
        info!(
            source = adapter.name(),
            mentions = part.mentions.len(),
            failed_calls = part.failed_calls,
            "Source finished"
        );
        collection.mentions.extend(part.mentions);
        collection.failed_calls += part.failed_calls;
    }
    collection
}

/// Ranked entities of one kind plus the statistics reported for them.
#[derive(Debug)]
pub struct Ranking {
    pub kind: EntityKind,
    pub ranked: Vec<RankedEntity>,
    pub summary: KindSummary,
}

/// Count ranked entities per tier, strongest tier first.
pub fn tier_counts(ranked: &[RankedEntity]) -> Vec<(String, usize)> {
    [Tier::VeryHigh, Tier::High, Tier::Medium, Tier::Low]
        .into_iter()
        .map(|tier| {
            let count = ranked.iter().filter(|r| r.tier == tier).count();
            (tier.label().to_string(), count)
        })
        .collect()
}

/// Aggregate the mentions of one kind and rank the records.
///
/// Mentions of other kinds are ignored.
#[instrument(level = "info", skip(collection, policy), fields(kind = kind.label()))]
pub fn build_ranking(collection: Collection, kind: EntityKind, policy: &ScoringPolicy, limit: usize) -> Ranking {
    let mut aggregator = Aggregator::new();
    aggregator.extend(collection.mentions.into_iter().filter(|m| m.kind == kind));

    let mentions = aggregator.accepted() + aggregator.dropped();
    let dropped_mentions = aggregator.dropped();
    let unique_entities = aggregator.record_count();
    let ranked = rank(aggregator.into_records(), policy, limit);
    info!(mentions, unique_entities, ranked = ranked.len(), "Ranked entities");

    let summary = KindSummary {
        mentions,
        dropped_mentions,
        unique_entities,
        ranked: ranked.len(),
        failed_source_calls: collection.failed_calls,
        tiers: tier_counts(&ranked),
        output_file: None,
    };
    Ranking { kind, ranked, summary }
}

/// Collect, aggregate and rank one entity kind using the adapters of that kind.
pub async fn track(
    adapters: &[BoxedAdapter],
    kind: EntityKind,
    groups: &[KeywordGroup],
    policy: &ScoringPolicy,
    limit: usize,
    delay: Duration,
) -> Ranking {
    let own: Vec<&dyn SourceAdapter> = adapters
        .iter()
        .map(|a| a.as_ref())
        .filter(|a| a.kind() == kind)
        .collect();
    if own.is_empty() {
        warn!(kind = kind.label(), "No sources enabled; report will be empty");
    }
    let collection = collect_mentions(own, groups, delay).await;
    build_ranking(collection, kind, policy, limit)
}
