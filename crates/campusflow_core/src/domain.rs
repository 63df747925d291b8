//! crates/campusflow_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single user-submitted issue record tied to a building and timestamp.
///
/// Reports are immutable once created. The pair `(building, submitted_at)`
/// is the storage key: writing the same pair twice is last-write-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub building: String,
    pub category: ReportCategory,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
    pub photo_url: Option<String>,
}

impl Report {
    /// The externally visible record identifier, derived from the storage key.
    pub fn report_id(&self) -> String {
        format!("{}_{}", self.building, self.submitted_at.to_rfc3339())
    }
}

/// The closed set of issue categories a report can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    Outlet,
    Lighting,
    Accessibility,
    Cleanliness,
    Other,
}

impl ReportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Outlet => "outlet",
            ReportCategory::Lighting => "lighting",
            ReportCategory::Accessibility => "accessibility",
            ReportCategory::Cleanliness => "cleanliness",
            ReportCategory::Other => "other",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a category name falls outside the known set.
#[derive(Debug, thiserror::Error)]
#[error("unknown report category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for ReportCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outlet" => Ok(ReportCategory::Outlet),
            "lighting" => Ok(ReportCategory::Lighting),
            "accessibility" => Ok(ReportCategory::Accessibility),
            "cleanliness" => Ok(ReportCategory::Cleanliness),
            "other" => Ok(ReportCategory::Other),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Read-only reference data describing one campus building.
///
/// Loaded from static configuration at startup; never created or mutated
/// by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub status: BuildingStatus,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingStatus {
    Quiet,
    Busy,
    Broken,
}

impl BuildingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingStatus::Quiet => "quiet",
            BuildingStatus::Busy => "busy",
            BuildingStatus::Broken => "broken",
        }
    }
}

/// A derived summary of recent reports, either AI-narrated or
/// deterministically aggregated. Recomputed on every trend query and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub summary: String,
    pub top_issues: Vec<TopIssue>,
    pub source: GenerationSource,
    pub generated_at: DateTime<Utc>,
}

/// One ranked (building, category) group inside a trend summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopIssue {
    pub building: String,
    pub category: ReportCategory,
    pub count: u64,
}

/// Which path produced a trend summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    Ai,
    Fallback,
}

impl GenerationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationSource::Ai => "ai",
            GenerationSource::Fallback => "fallback",
        }
    }
}

/// An unusual concentration of same-kind reports for one building inside
/// a short window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendAlert {
    pub building: String,
    pub category: ReportCategory,
    pub count: u64,
    pub window_minutes: u32,
    pub severity: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_parses_from_lowercase_names() {
        assert_eq!("outlet".parse::<ReportCategory>().unwrap(), ReportCategory::Outlet);
        assert_eq!(
            "cleanliness".parse::<ReportCategory>().unwrap(),
            ReportCategory::Cleanliness
        );
        assert!("plumbing".parse::<ReportCategory>().is_err());
    }

    #[test]
    fn report_id_is_derived_from_the_storage_key() {
        let report = Report {
            building: "ikb".to_string(),
            category: ReportCategory::Outlet,
            description: "dead outlet on level 3".to_string(),
            submitted_at: Utc.with_ymd_and_hms(2026, 8, 4, 9, 30, 0).unwrap(),
            photo_url: None,
        };
        assert_eq!(report.report_id(), "ikb_2026-08-04T09:30:00+00:00");
    }
}
