//! # certvet-cli
//!
//! Command-line front end for the `certvet` validation library.
//!
//! ## Features
//!
//! - **Mixed inputs**: `https://` URLs, certificate files, bare hostnames
//! - **Concurrent batches**: every location checked at once, reported in order
//! - **Tunable rules**: thresholds and severities per rule, or rules off entirely
//! - **Two output formats**: colored summary or JSON for pipelines

pub mod cli;
pub mod output;

pub use cli::run;
