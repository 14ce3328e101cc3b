// Core data structures for the trendlens aggregator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Supported trend data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Reddit,
}

impl Platform {
    /// Get string representation (matches the wire format)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Reddit => "reddit",
        }
    }

    /// Create from string, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" => Some(Self::Google),
            "reddit" => Some(Self::Reddit),
            _ => None,
        }
    }

    /// Get all platforms
    pub fn all() -> Vec<Self> {
        vec![Self::Google, Self::Reddit]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown platform: {s}"))
    }
}

/// The response unit returned to callers: platform plus raw and derived data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub platform: Platform,
    pub raw: Value,
    pub analysis: Value,
}

/// Persisted unit combining a query with its raw and derived data.
///
/// Write-once: records are inserted after a successful aggregation and
/// never updated. `recorded_at` is assigned at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRecord {
    pub id: Uuid,
    pub platform: Platform,
    pub query: String,
    pub raw: Value,
    pub analysis: Value,
    pub recorded_at: DateTime<Utc>,
}

impl TrendRecord {
    /// Build a record from a report, stamping the current time
    pub fn from_report(query: &str, report: &TrendReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform: report.platform,
            query: query.to_string(),
            raw: report.raw.clone(),
            analysis: report.analysis.clone(),
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_roundtrip() {
        assert_eq!(Platform::parse("google"), Some(Platform::Google));
        assert_eq!(Platform::parse("Reddit"), Some(Platform::Reddit));
        assert_eq!(Platform::parse("youtube"), None);
        assert_eq!(Platform::Google.as_str(), "google");
    }

    #[test]
    fn test_platform_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Reddit).unwrap();
        assert_eq!(json, "\"reddit\"");

        let back: Platform = serde_json::from_str("\"google\"").unwrap();
        assert_eq!(back, Platform::Google);
    }

    #[test]
    fn test_record_from_report() {
        let report = TrendReport {
            platform: Platform::Reddit,
            raw: serde_json::json!([]),
            analysis: serde_json::json!({"insights": "No results found"}),
        };

        let record = TrendRecord::from_report("ai", &report);
        assert_eq!(record.platform, Platform::Reddit);
        assert_eq!(record.query, "ai");
        assert_eq!(record.raw, report.raw);
    }

    #[test]
    fn test_report_wire_shape() {
        let report = TrendReport {
            platform: Platform::Google,
            raw: serde_json::json!({}),
            analysis: serde_json::json!({"insights": "Top rising: N/A"}),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["platform"], "google");
        assert!(value.get("raw").is_some());
        assert!(value.get("analysis").is_some());
    }
}
