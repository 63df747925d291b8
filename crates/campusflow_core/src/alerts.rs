//! crates/campusflow_core/src/alerts.rs
//!
//! Spike detection over recent reports: a burst of same-kind reports for
//! one building inside a short window is worth flagging to facilities staff.

use crate::aggregate::group_counts;
use crate::domain::{Report, TrendAlert};

/// Reports in one (building, category) group needed to raise an alert.
pub const SPIKE_THRESHOLD: u64 = 5;
/// The trailing window, in minutes, the caller should fetch reports for.
pub const SPIKE_WINDOW_MINUTES: u32 = 30;

/// Flags every (building, category) group with at least [`SPIKE_THRESHOLD`]
/// reports. Ordering matches the aggregator: count descending, ties broken
/// lexicographically.
pub fn detect_spikes(reports: &[Report]) -> Vec<TrendAlert> {
    let (groups, _) = group_counts(reports);
    groups
        .into_iter()
        .filter(|group| group.count >= SPIKE_THRESHOLD)
        .map(|group| TrendAlert {
            building: group.building,
            category: group.category,
            count: group.count,
            window_minutes: SPIKE_WINDOW_MINUTES,
            severity: "high".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportCategory;
    use chrono::{Duration, TimeZone, Utc};

    fn burst(building: &str, category: ReportCategory, count: usize) -> Vec<Report> {
        (0..count)
            .map(|i| Report {
                building: building.to_string(),
                category,
                description: format!("issue {i} at {building}"),
                submitted_at: Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()
                    + Duration::seconds(i as i64),
                photo_url: None,
            })
            .collect()
    }

    #[test]
    fn below_the_threshold_stays_quiet() {
        let reports = burst("IKB", ReportCategory::Outlet, 4);
        assert!(detect_spikes(&reports).is_empty());
    }

    #[test]
    fn reaching_the_threshold_raises_an_alert() {
        let reports = burst("IKB", ReportCategory::Outlet, 5);
        let alerts = detect_spikes(&reports);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].building, "IKB");
        assert_eq!(alerts[0].category, ReportCategory::Outlet);
        assert_eq!(alerts[0].count, 5);
        assert_eq!(alerts[0].window_minutes, SPIKE_WINDOW_MINUTES);
        assert_eq!(alerts[0].severity, "high");
    }

    #[test]
    fn alerts_are_ranked_like_the_aggregator() {
        let mut reports = burst("Library", ReportCategory::Lighting, 5);
        reports.extend(burst("IKB", ReportCategory::Outlet, 6));
        let alerts = detect_spikes(&reports);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].building, "IKB");
        assert_eq!(alerts[1].building, "Library");
    }
}
