//! Output module for reporting on harvested records
//!
//! This module handles:
//! - Loading record statistics from the store
//! - Printing them for the `--stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics, RecentRecord};
