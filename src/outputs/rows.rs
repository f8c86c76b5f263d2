//! Flat report rows, one struct per entity kind.
//!
//! Formatting is pure: ranked entities go in, rows come out, nothing is
//! mutated. Lists are capped at five entries; missing data becomes an empty
//! string.
//!
//! Field order and `serde` renames define the CSV columns, so every row type
//! also lists them in [`ReportRow::COLUMNS`] for header-only files.

use crate::models::{EntityRecord, RankedEntity};
use crate::utils::report_timestamp;
use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Serialize;

const LIST_CAP: usize = 5;

/// A row type written to its own report file.
pub trait ReportRow: Serialize {
    /// Header row, in serialization order.
    const COLUMNS: &'static [&'static str];
    /// File name inside the output directory.
    const FILE_NAME: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Company Name")]
    pub company_name: String,
    #[serde(rename = "Total Jobs")]
    pub total_jobs: u64,
    #[serde(rename = "Categories")]
    pub categories: String,
    #[serde(rename = "Signal Strength")]
    pub signal_strength: String,
    #[serde(rename = "Sample Roles")]
    pub sample_roles: String,
    #[serde(rename = "Data Sources")]
    pub data_sources: String,
    #[serde(rename = "Last Updated")]
    pub last_updated: String,
}

impl ReportRow for CompanyRow {
    const COLUMNS: &'static [&'static str] = &[
        "Rank",
        "Company Name",
        "Total Jobs",
        "Categories",
        "Signal Strength",
        "Sample Roles",
        "Data Sources",
        "Last Updated",
    ];
    const FILE_NAME: &'static str = "hiring_signals.csv";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Username/ID")]
    pub username: String,
    #[serde(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "Engagement Score")]
    pub engagement_score: u64,
    #[serde(rename = "Influence Score")]
    pub influence_score: String,
    #[serde(rename = "Topics Discussed")]
    pub topics_discussed: String,
    #[serde(rename = "Number of Posts")]
    pub number_of_posts: usize,
    #[serde(rename = "Sample Post")]
    pub sample_post: String,
    #[serde(rename = "Last Updated")]
    pub last_updated: String,
}

impl ReportRow for PersonRow {
    const COLUMNS: &'static [&'static str] = &[
        "Rank",
        "Username/ID",
        "Platform",
        "Engagement Score",
        "Influence Score",
        "Topics Discussed",
        "Number of Posts",
        "Sample Post",
        "Last Updated",
    ];
    const FILE_NAME: &'static str = "conversation_signals_people.csv";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublisherRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Publisher Name")]
    pub publisher_name: String,
    #[serde(rename = "Relevance Score")]
    pub relevance_score: u64,
    #[serde(rename = "Number of Articles")]
    pub number_of_articles: usize,
    #[serde(rename = "Topics Covered")]
    pub topics_covered: String,
    #[serde(rename = "Website URL")]
    pub website_url: String,
    #[serde(rename = "Sample Article")]
    pub sample_article: String,
    #[serde(rename = "Last Updated")]
    pub last_updated: String,
}

impl ReportRow for PublisherRow {
    const COLUMNS: &'static [&'static str] = &[
        "Rank",
        "Publisher Name",
        "Relevance Score",
        "Number of Articles",
        "Topics Covered",
        "Website URL",
        "Sample Article",
        "Last Updated",
    ];
    const FILE_NAME: &'static str = "conversation_signals_publishers.csv";
}

fn join_first<'a, I>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().take(LIST_CAP).join(separator)
}

fn categories(record: &EntityRecord) -> String {
    join_first(record.categories.iter().map(String::as_str), ", ")
}

fn sample_evidence(record: &EntityRecord) -> String {
    record.evidence.first().map(|e| e.title.clone()).unwrap_or_default()
}

pub fn company_rows(ranked: &[RankedEntity], generated_at: DateTime<Local>) -> Vec<CompanyRow> {
    let last_updated = report_timestamp(generated_at);
    ranked
        .iter()
        .map(|entry| CompanyRow {
            rank: entry.rank,
            company_name: entry.record.name.clone(),
            total_jobs: entry.record.scored_weight(),
            categories: categories(&entry.record),
            signal_strength: entry.tier.label().to_string(),
            sample_roles: join_first(entry.record.evidence.iter().map(|e| e.title.as_str()), "; "),
            data_sources: entry.record.sources.join(", "),
            last_updated: last_updated.clone(),
        })
        .collect()
}

pub fn person_rows(ranked: &[RankedEntity], generated_at: DateTime<Local>) -> Vec<PersonRow> {
    let last_updated = report_timestamp(generated_at);
    ranked
        .iter()
        .map(|entry| PersonRow {
            rank: entry.rank,
            username: entry.record.name.clone(),
            platform: entry.record.sources.join(", "),
            engagement_score: entry.record.scored_weight(),
            influence_score: entry.tier.label().to_string(),
            topics_discussed: categories(&entry.record),
            number_of_posts: entry.record.evidence.len(),
            sample_post: sample_evidence(&entry.record),
            last_updated: last_updated.clone(),
        })
        .collect()
}

pub fn publisher_rows(ranked: &[RankedEntity], generated_at: DateTime<Local>) -> Vec<PublisherRow> {
    let last_updated = report_timestamp(generated_at);
    ranked
        .iter()
        .map(|entry| PublisherRow {
            rank: entry.rank,
            publisher_name: entry.record.name.clone(),
            relevance_score: entry.score,
            number_of_articles: entry.record.evidence.len(),
            topics_covered: categories(&entry.record),
            website_url: entry.record.url.clone().unwrap_or_default(),
            sample_article: sample_evidence(&entry.record),
            last_updated: last_updated.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, Evidence, Tier};
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 10, 3, 9, 5, 0).unwrap()
    }

    fn ranked(kind: EntityKind, name: &str, categories: &[&str], titles: &[&str]) -> RankedEntity {
        RankedEntity {
            rank: 1,
            score: 90,
            tier: Tier::High,
            record: EntityRecord {
                kind,
                name: name.to_string(),
                categories: categories.iter().map(|c| c.to_string()).collect(),
                sources: vec!["Indeed".to_string(), "LinkedIn".to_string()],
                evidence: titles.iter().map(|t| Evidence::titled(*t)).collect(),
                total_weight: 8,
                url: None,
            },
        }
    }

    fn header_of<R: ReportRow>(row: &R) -> Vec<String> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(row).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        text.lines().next().unwrap().split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_company_row() {
        let entry = ranked(
            EntityKind::Company,
            "Acme Inc",
            &["a", "b", "c", "d", "e", "f"],
            &["R1", "R2", "R3", "R4", "R5", "R6"],
        );
        let rows = company_rows(&[entry], at());
        let row = &rows[0];
        assert_eq!(row.rank, 1);
        assert_eq!(row.company_name, "Acme Inc");
        assert_eq!(row.total_jobs, 8);
        assert_eq!(row.categories, "a, b, c, d, e");
        assert_eq!(row.signal_strength, "High");
        assert_eq!(row.sample_roles, "R1; R2; R3; R4; R5");
        assert_eq!(row.data_sources, "Indeed, LinkedIn");
        assert_eq!(row.last_updated, "2025-10-03 09:05:00");
    }

    #[test]
    fn test_missing_data_becomes_empty_strings() {
        let entry = ranked(EntityKind::Publisher, "Dark Reading", &[], &[]);
        let publisher = &publisher_rows(std::slice::from_ref(&entry), at())[0];
        assert_eq!(publisher.topics_covered, "");
        assert_eq!(publisher.sample_article, "");
        assert_eq!(publisher.website_url, "");
        assert_eq!(publisher.number_of_articles, 0);

        let person = &person_rows(&[entry], at())[0];
        assert_eq!(person.sample_post, "");
        assert_eq!(person.topics_discussed, "");
    }

    #[test]
    fn test_person_and_publisher_rows() {
        let mut person = ranked(EntityKind::Person, "@cloudsecpro", &["sspm"], &["SSPM tips", "More"]);
        person.record.sources = vec!["Reddit".to_string()];
        let row = &person_rows(std::slice::from_ref(&person), at())[0];
        assert_eq!(row.platform, "Reddit");
        assert_eq!(row.engagement_score, 8);
        assert_eq!(row.influence_score, "High");
        assert_eq!(row.number_of_posts, 2);
        assert_eq!(row.sample_post, "SSPM tips");

        person.record.total_weight = -7;
        assert_eq!(person_rows(&[person], at())[0].engagement_score, 0);

        let mut publisher = ranked(EntityKind::Publisher, "SecurityWeek", &["sspm"], &["A", "B", "C"]);
        publisher.score = 3;
        publisher.record.url = Some("https://www.securityweek.com".to_string());
        let row = &publisher_rows(&[publisher], at())[0];
        assert_eq!(row.relevance_score, 3);
        assert_eq!(row.website_url, "https://www.securityweek.com");
        assert_eq!(row.sample_article, "A");
    }

    #[test]
    fn test_formatting_does_not_mutate_input() {
        let input = vec![ranked(EntityKind::Company, "Acme", &["sspm"], &["R1"])];
        let before = input.clone();
        let _ = company_rows(&input, at());
        assert_eq!(input, before);
    }

    #[test]
    fn test_columns_match_serialized_headers() {
        let company = ranked(EntityKind::Company, "Acme", &[], &[]);
        let at = at();
        assert_eq!(header_of(&company_rows(std::slice::from_ref(&company), at)[0]), CompanyRow::COLUMNS);
        assert_eq!(header_of(&person_rows(std::slice::from_ref(&company), at)[0]), PersonRow::COLUMNS);
        assert_eq!(header_of(&publisher_rows(&[company], at)[0]), PublisherRow::COLUMNS);
    }
}
