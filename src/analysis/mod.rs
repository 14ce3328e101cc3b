//! Derived trend statistics per platform
//!
//! Every function in this module is a pure function of the raw source
//! data: identical raw input yields identical analysis output, and no
//! state crosses invocations. The pipeline relies on this to keep the
//! read path independent of storage availability.

pub mod google;
pub mod reddit;

pub use google::{GoogleAnalysis, RisingKeyword};
pub use reddit::{KeywordCount, RedditAnalysis, TopPost};

use thiserror::Error;

/// Number of entries kept in every ranked summary
pub const TOP_N: usize = 5;

/// Errors that can occur during the analysis step
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A series point does not line up with the declared keyword columns
    #[error("series point {index} has {got} values for {expected} keyword columns")]
    ColumnMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
}
