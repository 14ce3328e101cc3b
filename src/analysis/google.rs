//! Rising-keyword analysis over Google Trends interest series

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::{AnalysisError, TOP_N};
use crate::sources::{GoogleRaw, RelatedQuery};

/// Derived summary for a Google Trends fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleAnalysis {
    /// Keyword columns ranked by mean period-over-period percentage
    /// change, descending, capped at [`TOP_N`]
    pub rising_keywords: Vec<RisingKeyword>,

    /// Up to [`TOP_N`] entries of the source's "top" related-query list
    pub top_related: Vec<RelatedQuery>,

    /// One-line summary naming the top riser
    pub insights: String,
}

/// A keyword column with its rising score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RisingKeyword {
    pub keyword: String,
    pub score: f64,
}

/// Compute the derived summary for a raw Google Trends payload.
///
/// Per keyword column the score is the mean of period-over-period
/// percentage change across consecutive samples. Pairs whose previous
/// value is zero carry no defined change and are skipped; a column with
/// no defined pairs scores 0.
pub fn analyze(raw: &GoogleRaw) -> Result<GoogleAnalysis, AnalysisError> {
    let series = &raw.interest_over_time;
    let expected = series.keywords.len();

    for (index, point) in series.points.iter().enumerate() {
        if point.values.len() != expected {
            return Err(AnalysisError::ColumnMismatch {
                index,
                expected,
                got: point.values.len(),
            });
        }
    }

    let mut rising_keywords = Vec::new();

    if !series.is_empty() {
        for (column, keyword) in series.keywords.iter().enumerate() {
            let score = mean_percent_change(
                series.points.iter().map(|point| point.values[column]),
            );
            rising_keywords.push(RisingKeyword {
                keyword: keyword.clone(),
                score,
            });
        }

        rising_keywords.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rising_keywords.truncate(TOP_N);
    }

    let top_related: Vec<RelatedQuery> = raw
        .related_queries
        .top
        .iter()
        .take(TOP_N)
        .cloned()
        .collect();

    let insights = match rising_keywords.first() {
        Some(top) => format!("Top rising: {}", top.keyword),
        None => "Top rising: N/A".to_string(),
    };

    Ok(GoogleAnalysis {
        rising_keywords,
        top_related,
        insights,
    })
}

/// Mean of period-over-period percentage change for one value column
fn mean_percent_change(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();

    let changes: Vec<f64> = values
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect();

    if changes.is_empty() {
        0.0
    } else {
        changes.mean()
    }
}
