//! Merging raw mentions into one record per logical entity.
//!
//! Sources spell the same company many ways ("Acme Inc", "ACME, LLC",
//! "Acme  Corp."). Every mention is reduced to an identity key and all
//! mentions sharing a key fold into a single [`EntityRecord`].
//!
//! The key is a pure function of the raw name:
//! 1. internal whitespace collapsed and trimmed
//! 2. trailing legal suffixes (`Inc`, `LLC`, `Corp`, `Ltd`) removed, repeatedly
//! 3. lower-cased
//!
//! Records are kept in first-seen order so the ranker can break score ties
//! by arrival.

use crate::models::{EntityRecord, RawMention};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static LEGAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[,\s]+(inc|llc|corp|ltd)\.?$").expect("valid suffix regex"));

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean a company-style name for display comparison: whitespace collapsed
/// and legal suffixes stripped, casing preserved.
pub fn clean_name(name: &str) -> String {
    let mut cleaned = collapse_whitespace(name);
    loop {
        let stripped = LEGAL_SUFFIX.replace(&cleaned, "").trim().to_string();
        if stripped == cleaned || stripped.is_empty() {
            break;
        }
        cleaned = stripped;
    }
    cleaned
}

/// The normalized identity key for a raw entity name.
///
/// Returns `None` for empty or whitespace-only names, which callers treat
/// as "drop this mention".
pub fn identity_key(name: &str) -> Option<String> {
    let cleaned = clean_name(name);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_lowercase())
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

impl EntityRecord {
    /// A fresh record seeded from its first mention.
    fn seed(mention: RawMention) -> Self {
        let mut record = Self {
            kind: mention.kind,
            name: collapse_whitespace(&mention.entity),
            categories: Vec::new(),
            sources: Vec::new(),
            evidence: Vec::new(),
            total_weight: 0,
            url: None,
        };
        record.absorb(mention);
        record
    }

    /// Fold another mention of the same entity into this record.
    fn absorb(&mut self, mention: RawMention) {
        self.total_weight = self.total_weight.saturating_add(mention.weight_or_zero());
        push_unique(&mut self.categories, &mention.category);
        push_unique(&mut self.sources, &mention.source);
        if self.url.is_none() {
            self.url = mention.entity_url.filter(|u| !u.is_empty());
        }
        if let Some(evidence) = mention.evidence {
            self.evidence.push(evidence);
        }
    }
}

/// Merge a mention into an optional existing record.
///
/// A mention with an empty name is dropped and `existing` comes back
/// untouched. Otherwise the mention seeds a new record or is folded into
/// the existing one. Callers are responsible for only pairing a mention with
/// the record that shares its identity key.
pub fn merge(existing: Option<EntityRecord>, mention: RawMention) -> Option<EntityRecord> {
    if identity_key(&mention.entity).is_none() {
        return existing;
    }
    match existing {
        Some(mut record) => {
            record.absorb(mention);
            Some(record)
        }
        None => Some(EntityRecord::seed(mention)),
    }
}

/// Keyed accumulator owning every record of a run until it is handed to the ranker.
///
/// Each identity key owns one slot; every accepted mention goes through
/// [`merge`] against the record in its slot.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Vec<Option<EntityRecord>>,
    positions: HashMap<String, usize>,
    accepted: usize,
    dropped: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one mention. Returns `false` when the mention was dropped.
    pub fn push(&mut self, mention: RawMention) -> bool {
        let Some(key) = identity_key(&mention.entity) else {
            debug!(source = %mention.source, keyword = %mention.keyword, "Dropping mention with empty entity name");
            self.dropped += 1;
            return false;
        };

        self.accepted += 1;
        let index = *self.positions.entry(key).or_insert_with(|| {
            self.records.push(None);
            self.records.len() - 1
        });
        let slot = &mut self.records[index];
        *slot = merge(slot.take(), mention);
        true
    }

    pub fn extend<I: IntoIterator<Item = RawMention>>(&mut self, mentions: I) {
        for mention in mentions {
            self.push(mention);
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        identity_key(name)
            .and_then(|key| self.positions.get(&key))
            .and_then(|&index| self.records[index].as_ref())
    }

    /// Hand the records over in first-seen order.
    pub fn into_records(self) -> Vec<EntityRecord> {
        self.records.into_iter().flatten().collect()
    }
}
