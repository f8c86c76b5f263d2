//! Seeded synthetic source for offline runs.
//!
//! Produces realistic-looking mentions without touching the network: job
//! postings from a list of well-known software companies (sometimes with a
//! legal suffix, so deduplication has something to do), posts by security
//! personalities on X and Reddit, and articles from the configured publishers.
//!
//! Output is a pure function of the seed, the entity kind and the query, so a
//! sample run is reproducible.

use super::{SearchQuery, SourceAdapter};
use crate::config::PublisherFeed;
use crate::error::SourceUnavailable;
use crate::models::{EntityKind, Evidence, RawMention};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

pub const SOURCE_NAME: &str = "Sample";

const COMPANIES: &[&str] = &[
    "Microsoft", "Google", "Amazon", "Salesforce", "Oracle", "IBM", "Cisco",
    "Palo Alto Networks", "CrowdStrike", "Zscaler", "Okta", "Auth0", "Splunk",
    "Datadog", "New Relic", "ServiceNow", "Workday", "Snowflake", "Databricks",
    "GitHub", "GitLab", "Atlassian", "Slack", "Zoom", "Dropbox", "Box",
    "DocuSign", "HubSpot", "MongoDB", "Elastic", "Confluent", "Hashicorp",
    "Twilio", "Stripe", "Shopify", "Cloudflare", "Fastly", "Akamai",
    "Fortinet", "Check Point", "Proofpoint", "Mimecast", "Rapid7", "Qualys",
    "Tenable", "CyberArk", "SailPoint", "Ping Identity", "Zendesk", "Notion",
];

const LEGAL_SUFFIXES: &[&str] = &["Inc", "Inc.", "LLC", "Corp", "Ltd", ", Inc."];

const ROLES: &[&str] = &[
    "SaaS Security Engineer",
    "Cloud Security Architect",
    "SaaS Security Analyst",
    "SSPM Engineer",
    "SaaS Compliance Manager",
    "AI Security Engineer",
    "GenAI Security Specialist",
    "SaaS Security Posture Manager",
    "Cloud Security Engineer",
    "SaaS Governance Analyst",
    "AI Compliance Engineer",
    "SaaS Security Consultant",
    "Security Engineer - SaaS",
    "SaaS Risk Analyst",
];

const JOB_BOARDS: &[&str] = &["Indeed", "LinkedIn"];

const USERNAMES: &[&str] = &[
    "@securityexpert", "@cloudsecpro", "@saassec", "@cyberdefender",
    "@infosecpro", "@securityguru", "@cloudarchitect", "@secops",
    "@saascompliance", "@aisecurity", "@sspmexpert", "@cyberanalyst",
    "@securityresearcher", "@cloudsecurity", "@saassecops", "@infosec",
    "@securityengineer", "@cybersecurity", "@cloudops", "@devsecops",
];

const PLATFORMS: &[&str] = &["X (Twitter)", "Reddit"];

const POSTS: &[&str] = &[
    "New SaaS security framework released",
    "SSPM best practices for 2025",
    "AI agent security concerns in enterprise SaaS",
    "Salesforce breach analysis and lessons learned",
    "Gainsight incident: what we know so far",
    "Salesloft supply chain attack deep dive",
    "SaaS compliance requirements for healthcare",
    "AI compliance regulations update",
    "SaaS security posture management guide",
    "GenAI security risks in SaaS platforms",
];

/// FNV-1a, used to give every query its own reproducible random stream.
fn stable_hash(parts: &[&str]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for part in parts {
        for byte in part.bytes().chain(std::iter::once(0xff)) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
    }
    hash
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct SampleSource {
    kind: EntityKind,
    seed: u64,
    publishers: Vec<PublisherFeed>,
}

impl SampleSource {
    pub fn new(kind: EntityKind, seed: u64) -> Self {
        Self {
            kind,
            seed,
            publishers: Vec::new(),
        }
    }

    /// Publishers the sample publisher source reports on.
    pub fn with_publishers(mut self, publishers: &[PublisherFeed]) -> Self {
        self.publishers = publishers.to_vec();
        self
    }

    fn rng_for(&self, query: &SearchQuery) -> StdRng {
        let salt = stable_hash(&[self.kind.label(), &query.category, &query.keyword]);
        StdRng::seed_from_u64(self.seed ^ salt)
    }

    /// Generate the mentions for one query.
    pub fn generate(&self, query: &SearchQuery) -> Vec<RawMention> {
        let mut rng = self.rng_for(query);
        match self.kind {
            EntityKind::Company => self.companies(&mut rng, query),
            EntityKind::Person => self.people(&mut rng, query),
            EntityKind::Publisher => self.articles(&mut rng, query),
        }
    }

    fn companies(&self, rng: &mut StdRng, query: &SearchQuery) -> Vec<RawMention> {
        let postings = rng.random_range(3..=12);
        (0..postings)
            .map(|_| {
                let base = pick(rng, COMPANIES);
                let name = if rng.random_bool(0.3) {
                    let suffix = pick(rng, LEGAL_SUFFIXES);
                    if suffix.starts_with(',') {
                        format!("{base}{suffix}")
                    } else {
                        format!("{base} {suffix}")
                    }
                } else {
                    base.to_string()
                };
                let board = pick(rng, JOB_BOARDS);
                RawMention::new(EntityKind::Company, name, board, &query.category, &query.keyword)
                    .with_weight(rng.random_range(1..=5))
                    .with_evidence(Evidence::titled(pick(rng, ROLES)))
            })
            .collect()
    }

    fn people(&self, rng: &mut StdRng, query: &SearchQuery) -> Vec<RawMention> {
        let posts = rng.random_range(2..=8);
        (0..posts)
            .map(|_| {
                let username = pick(rng, USERNAMES);
                let platform = pick(rng, PLATFORMS);
                // A few posts go viral; most collect modest engagement.
                let engagement: i64 = if rng.random_bool(0.1) {
                    rng.random_range(500..=2500)
                } else {
                    rng.random_range(5..=250)
                };
                RawMention::new(EntityKind::Person, username, platform, &query.category, &query.keyword)
                    .with_weight(engagement)
                    .with_evidence(Evidence {
                        title: pick(rng, POSTS).to_string(),
                        url: None,
                        metric: Some(engagement),
                        published: None,
                    })
            })
            .collect()
    }

    fn articles(&self, rng: &mut StdRng, query: &SearchQuery) -> Vec<RawMention> {
        let mut mentions = Vec::new();
        for publisher in &self.publishers {
            if !rng.random_bool(0.4) {
                continue;
            }
            let count = rng.random_range(1..=3);
            for _ in 0..count {
                mentions.push(
                    RawMention::new(
                        EntityKind::Publisher,
                        &publisher.name,
                        super::publishers::SOURCE_NAME,
                        &query.category,
                        &query.keyword,
                    )
                    .with_weight(1)
                    .with_entity_url(&publisher.url)
                    .with_evidence(Evidence::titled(pick(rng, POSTS))),
                );
            }
        }
        mentions
    }
}

#[async_trait]
impl SourceAdapter for SampleSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawMention>, SourceUnavailable> {
        Ok(self.generate(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::identity_key;
    use crate::config::TrackerConfig;

    #[test]
    fn test_same_seed_same_output() {
        let query = SearchQuery::new("sspm", "SSPM");
        for kind in EntityKind::ALL {
            let a = SampleSource::new(kind, 42).with_publishers(&TrackerConfig::default().publishers);
            let b = SampleSource::new(kind, 42).with_publishers(&TrackerConfig::default().publishers);
            assert_eq!(a.generate(&query), b.generate(&query));
        }
    }

    #[test]
    fn test_queries_get_distinct_streams() {
        let source = SampleSource::new(EntityKind::Company, 42);
        let a = source.generate(&SearchQuery::new("sspm", "SSPM"));
        let b = source.generate(&SearchQuery::new("sspm", "SaaS posture"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_company_mentions_normalize_to_known_companies() {
        let source = SampleSource::new(EntityKind::Company, 7);
        let query = SearchQuery::new("ai_compliance", "AI governance");
        let mentions = source.generate(&query);
        assert!((3..=12).contains(&mentions.len()));
        for mention in &mentions {
            assert_eq!(mention.kind, EntityKind::Company);
            assert_eq!(mention.category, "ai_compliance");
            let key = identity_key(&mention.entity).unwrap();
            assert!(COMPANIES.iter().any(|c| identity_key(c).as_deref() == Some(key.as_str())));
            assert!((1..=5).contains(&mention.weight_or_zero()));
        }
    }

    #[test]
    fn test_publisher_mentions_use_configured_publishers() {
        let publishers = TrackerConfig::default().publishers;
        let source = SampleSource::new(EntityKind::Publisher, 3).with_publishers(&publishers);
        let mut seen = 0;
        for keyword in ["SSPM", "SaaS Security", "GenAI security", "Salesforce breach"] {
            for mention in source.generate(&SearchQuery::new("topic", keyword)) {
                let publisher = publishers.iter().find(|p| p.name == mention.entity).unwrap();
                assert_eq!(mention.entity_url.as_deref(), Some(publisher.url.as_str()));
                seen += 1;
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn test_publisher_source_without_publishers_is_empty() {
        let source = SampleSource::new(EntityKind::Publisher, 1);
        assert!(source.generate(&SearchQuery::new("sspm", "SSPM")).is_empty());
    }
}
