//! Report generation.
//!
//! # Submodules
//!
//! - [`rows`]: Turns ranked entities into flat, per-kind report rows
//! - [`tables`]: Writes rows as CSV files, one per entity kind
//! - [`json`]: Writes the run summary
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── hiring_signals.csv                   # companies
//! ├── conversation_signals_people.csv      # people
//! ├── conversation_signals_publishers.csv  # publishers
//! └── run_summary.json
//! ```

pub mod json;
pub mod rows;
pub mod tables;
