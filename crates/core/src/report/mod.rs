//! Ranking report over a loaded movies database

pub mod error;
pub mod ranking;

pub use error::ReportError;
pub use ranking::{RankedMovie, RankingReport, ReportStats};
