//! # GTM Signal Tracker
//!
//! Finds go-to-market signals around SaaS security: which companies are
//! hiring for it, which people talk about it and which publishers cover it.
//! Writes one ranked CSV report per entity kind.
//!
//! ## Features
//!
//! - Searches Indeed and LinkedIn job listings for hiring keywords
//! - Searches Reddit discussions and cybersecurity publisher feeds for
//!   conversation topics
//! - Merges spelling variants of the same entity ("Acme Inc", "ACME, LLC")
//! - Scores, tiers and ranks entities with per-kind policies
//! - Offline `--sample` mode with seeded synthetic data
//!
//! ## Usage
//!
//! ```sh
//! gtm_signal_tracker -c tracker.yaml -o ./outputs
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Collection**: Source adapters turn keyword searches into raw mentions
//! 2. **Aggregation**: Mentions are normalized and merged per entity
//! 3. **Ranking**: Records are scored, tiered, sorted and capped
//! 4. **Output**: Ranked entities become flat rows written as CSV, plus a run summary

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod error;
mod http;
mod models;
mod outputs;
mod pipeline;
mod ranking;
mod sources;
mod utils;

use cli::Cli;
use config::TrackerConfig;
use error::ReportError;
use http::HttpClient;
use models::{EntityKind, RunSummary};
use outputs::{json, rows, tables};
use pipeline::Ranking;
use utils::{ensure_writable_dir, report_timestamp};

/// Format and write the report for one ranked entity kind.
async fn write_ranking(
    ranking: &Ranking,
    dir: &Path,
    generated_at: chrono::DateTime<Local>,
) -> Result<PathBuf, ReportError> {
    match ranking.kind {
        EntityKind::Company => tables::write_report(dir, &rows::company_rows(&ranking.ranked, generated_at)).await,
        EntityKind::Person => tables::write_report(dir, &rows::person_rows(&ranking.ranked, generated_at)).await,
        EntityKind::Publisher => {
            tables::write_report(dir, &rows::publisher_rows(&ranking.ranked, generated_at)).await
        }
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("gtm_signal_tracker starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load configuration ----
    let mut config = match TrackerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    args.apply_to(&mut config);
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid command-line overrides");
        return Err(e.into());
    }

    // Early check: ensure the output dir is writable
    let output_dir = config.output.dir.clone();
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Build sources ----
    let (adapters, delay, mode) = if args.sample {
        let adapters = sources::sample_adapters(&config, args.sample_seed);
        (adapters, Duration::ZERO, "sample")
    } else {
        let client = HttpClient::from_settings(&config.http)?;
        let adapters = sources::live_adapters(&config, client);
        (adapters, Duration::from_millis(config.http.request_delay_ms), "live")
    };
    let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
    info!(mode, sources = ?names, "Sources ready");

    // ---- Collect, rank and write each entity kind ----
    let generated_at = Local::now();
    let mut summaries = Vec::with_capacity(EntityKind::ALL.len());
    for kind in EntityKind::ALL {
        info!(kind = kind.label(), "Tracking signals");
        let mut ranking = pipeline::track(
            &adapters,
            kind,
            config.keywords_for(kind),
            config.scoring.policy(kind),
            config.output.limit(kind),
            delay,
        )
        .await;

        let path = match write_ranking(&ranking, &output_dir, generated_at).await {
            Ok(path) => path,
            Err(e) => {
                error!(kind = kind.label(), error = %e, "Failed to write report");
                return Err(e.into());
            }
        };
        ranking.summary.output_file = Some(path.display().to_string());
        summaries.push(ranking.summary);
    }

    let elapsed = start_time.elapsed();
    let mut summaries = summaries.into_iter();
    let summary = RunSummary {
        generated_at: report_timestamp(generated_at),
        mode: mode.to_string(),
        elapsed_secs: elapsed.as_secs_f64(),
        companies: summaries.next().unwrap_or_default(),
        people: summaries.next().unwrap_or_default(),
        publishers: summaries.next().unwrap_or_default(),
    };
    if let Err(e) = json::write_run_summary(&summary, &output_dir).await {
        error!(error = %e, "Failed to write run summary");
        return Err(e.into());
    }

    info!(
        companies = summary.companies.ranked,
        people = summary.people.ranked,
        publishers = summary.publishers.ranked,
        "Reports written"
    );
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
