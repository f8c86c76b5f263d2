//! Command-line interface definitions for the GTM signal tracker.
//!
//! Every option can also be given through an environment variable. Options
//! given here override the configuration file.

use crate::config::TrackerConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the GTM signal tracker.
///
/// # Examples
///
/// ```sh
/// # Live run with built-in defaults, reports in ./outputs
/// gtm_signal_tracker
///
/// # Custom config and output directory
/// gtm_signal_tracker -c tracker.yaml -o ./reports
///
/// # Offline demo data, reproducible
/// gtm_signal_tracker --sample --sample-seed 7
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the CSV reports and run summary are written to
    #[arg(short, long, env = "GTM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "GTM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use seeded synthetic sources instead of the live ones
    #[arg(long, env = "GTM_SAMPLE")]
    pub sample: bool,

    /// Seed for --sample
    #[arg(long, env = "GTM_SAMPLE_SEED", default_value_t = 42)]
    pub sample_seed: u64,

    /// Maximum number of companies in the hiring report
    #[arg(long, env = "GTM_COMPANIES_LIMIT")]
    pub companies_limit: Option<usize>,

    /// Maximum number of people in the conversation report
    #[arg(long, env = "GTM_PEOPLE_LIMIT")]
    pub people_limit: Option<usize>,

    /// Maximum number of publishers in the publisher report
    #[arg(long, env = "GTM_PUBLISHERS_LIMIT")]
    pub publishers_limit: Option<usize>,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut TrackerConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(limit) = self.companies_limit {
            config.output.companies_limit = limit;
        }
        if let Some(limit) = self.people_limit {
            config.output.people_limit = limit;
        }
        if let Some(limit) = self.publishers_limit {
            config.output.publishers_limit = limit;
        }
    }
}
