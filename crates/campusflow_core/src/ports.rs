//! crates/campusflow_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete store and text-generation services.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::Report;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type shared by all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The caller supplied a malformed report. User-correctable; carries
    /// field-level detail.
    #[error("invalid value for '{field}': {message}")]
    Validation { field: &'static str, message: String },
    /// The external store could not be reached. Surfaced to the caller as
    /// retryable; never retried inside the core.
    #[error("report store unavailable: {0}")]
    StoreUnavailable(String),
    /// The text-generation service failed or produced an unusable response.
    /// Always absorbed by the deterministic fallback, never surfaced.
    #[error("text generation failed: {0}")]
    Generation(String),
    /// A catch-all for any other unexpected errors.
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Checks the field invariants the `put` contract requires. Store adapters
/// call this before writing so a malformed report never reaches the store.
///
/// Category and timestamp presence are already guaranteed by the types;
/// what remains is that the free-form fields are not blank.
pub fn validate(report: &Report) -> PortResult<()> {
    if report.building.trim().is_empty() {
        return Err(PortError::Validation {
            field: "building",
            message: "must not be empty".to_string(),
        });
    }
    if report.description.trim().is_empty() {
        return Err(PortError::Validation {
            field: "description",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persists one report with a single atomic write keyed by
    /// `(building, submitted_at)`. Re-putting an existing key overwrites it.
    async fn put(&self, report: &Report) -> PortResult<()>;

    /// All reports whose timestamp falls within the given UTC day, oldest
    /// first, optionally restricted to one building. A day with no reports
    /// yields an empty vec, not an error.
    async fn list_day(&self, day: NaiveDate, building: Option<&str>) -> PortResult<Vec<Report>>;

    /// Reports submitted at or after `cutoff`, oldest first.
    async fn list_since(&self, cutoff: DateTime<Utc>) -> PortResult<Vec<Report>>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one prompt to the text-generation service and returns the raw
    /// model text. Implementations enforce their own fixed request timeout;
    /// a single attempt is made, with no retries.
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportCategory;
    use chrono::Utc;

    fn report(building: &str, description: &str) -> Report {
        Report {
            building: building.to_string(),
            category: ReportCategory::Outlet,
            description: description.to_string(),
            submitted_at: Utc::now(),
            photo_url: None,
        }
    }

    #[test]
    fn accepts_a_well_formed_report() {
        assert!(validate(&report("ikb", "no power at desk 12")).is_ok());
    }

    #[test]
    fn rejects_a_blank_building() {
        let err = validate(&report("  ", "no power")).unwrap_err();
        assert!(matches!(err, PortError::Validation { field: "building", .. }));
    }

    #[test]
    fn rejects_a_blank_description() {
        let err = validate(&report("ikb", "")).unwrap_err();
        assert!(matches!(err, PortError::Validation { field: "description", .. }));
    }
}
