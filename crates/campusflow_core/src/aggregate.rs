//! crates/campusflow_core/src/aggregate.rs
//!
//! The deterministic fallback aggregation path: pure statistics over a
//! report set, used whenever the text-generation service is unavailable
//! or produces an unusable response.

use std::collections::HashMap;

use chrono::Utc;
use tracing::warn;

use crate::domain::{GenerationSource, Report, ReportCategory, TopIssue, TrendSummary};

/// How many issue groups a summary carries at most.
pub const TOP_ISSUE_LIMIT: usize = 3;

/// Groups reports by (building, category) and produces a ranked summary.
///
/// Deterministic and idempotent: groups are ordered by count descending,
/// ties broken by lexicographic (building, category) order, so the same
/// report set always yields the same sequence regardless of input order.
/// Reports with a blank building are skipped; the skip count is emitted
/// as a diagnostic.
pub fn aggregate(reports: &[Report]) -> TrendSummary {
    let (groups, skipped) = group_counts(reports);
    if skipped > 0 {
        warn!(skipped, "skipped malformed reports during aggregation");
    }
    let top_issues: Vec<TopIssue> = groups.into_iter().take(TOP_ISSUE_LIMIT).collect();
    TrendSummary {
        summary: narrative(reports.len() - skipped, &top_issues),
        top_issues,
        source: GenerationSource::Fallback,
        generated_at: Utc::now(),
    }
}

/// Counts reports per (building, category) and ranks the groups. Shared
/// with spike detection, which applies a threshold on the same grouping.
///
/// Returns the ranked groups and how many reports were skipped for having
/// a blank building.
pub(crate) fn group_counts(reports: &[Report]) -> (Vec<TopIssue>, usize) {
    let mut counts: HashMap<(String, ReportCategory), u64> = HashMap::new();
    let mut skipped = 0usize;
    for report in reports {
        if report.building.trim().is_empty() {
            skipped += 1;
            continue;
        }
        *counts
            .entry((report.building.clone(), report.category))
            .or_insert(0) += 1;
    }

    let mut groups: Vec<TopIssue> = counts
        .into_iter()
        .map(|((building, category), count)| TopIssue {
            building,
            category,
            count,
        })
        .collect();
    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.building.cmp(&b.building))
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    (groups, skipped)
}

fn narrative(analyzed: usize, top_issues: &[TopIssue]) -> String {
    if top_issues.is_empty() {
        return "No reports available for analysis.".to_string();
    }
    let listed: Vec<String> = top_issues
        .iter()
        .map(|issue| format!("{} at {} (x{})", issue.category, issue.building, issue.count))
        .collect();
    format!(
        "Analyzed {} reports today. Top issues: {}.",
        analyzed,
        listed.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn report(building: &str, category: ReportCategory, offset_secs: i64) -> Report {
        Report {
            building: building.to_string(),
            category,
            description: format!("issue at {building}"),
            submitted_at: Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
            photo_url: None,
        }
    }

    #[test]
    fn ranks_groups_by_count_descending() {
        let reports = vec![
            report("IKB", ReportCategory::Outlet, 0),
            report("IKB", ReportCategory::Outlet, 1),
            report("Library", ReportCategory::Lighting, 2),
        ];
        let summary = aggregate(&reports);
        assert_eq!(summary.source, GenerationSource::Fallback);
        assert_eq!(
            summary.top_issues,
            vec![
                TopIssue {
                    building: "IKB".to_string(),
                    category: ReportCategory::Outlet,
                    count: 2,
                },
                TopIssue {
                    building: "Library".to_string(),
                    category: ReportCategory::Lighting,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn output_is_independent_of_input_order() {
        let mut reports = vec![
            report("IKB", ReportCategory::Outlet, 0),
            report("Library", ReportCategory::Lighting, 1),
            report("IKB", ReportCategory::Outlet, 2),
            report("Nest", ReportCategory::Cleanliness, 3),
            report("Library", ReportCategory::Lighting, 4),
        ];
        let forward = aggregate(&reports);
        reports.reverse();
        let backward = aggregate(&reports);
        assert_eq!(forward.top_issues, backward.top_issues);
        assert_eq!(forward.summary, backward.summary);
    }

    #[test]
    fn ties_break_on_building_then_category() {
        let reports = vec![
            report("B", ReportCategory::Outlet, 0),
            report("A", ReportCategory::Lighting, 1),
            report("A", ReportCategory::Accessibility, 2),
        ];
        let summary = aggregate(&reports);
        let order: Vec<(&str, ReportCategory)> = summary
            .top_issues
            .iter()
            .map(|issue| (issue.building.as_str(), issue.category))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A", ReportCategory::Accessibility),
                ("A", ReportCategory::Lighting),
                ("B", ReportCategory::Outlet),
            ]
        );
    }

    #[test]
    fn caps_the_summary_at_three_groups() {
        let reports = vec![
            report("A", ReportCategory::Outlet, 0),
            report("A", ReportCategory::Outlet, 1),
            report("B", ReportCategory::Lighting, 2),
            report("C", ReportCategory::Cleanliness, 3),
            report("D", ReportCategory::Accessibility, 4),
        ];
        let summary = aggregate(&reports);
        assert_eq!(summary.top_issues.len(), 3);
        // The x2 group leads; the last lexicographic singleton falls off.
        assert_eq!(summary.top_issues[0].building, "A");
        assert!(summary.top_issues.iter().all(|issue| issue.building != "D"));
    }

    #[test]
    fn skips_reports_without_a_building() {
        let reports = vec![
            report("", ReportCategory::Outlet, 0),
            report("IKB", ReportCategory::Outlet, 1),
        ];
        let summary = aggregate(&reports);
        assert_eq!(summary.top_issues.len(), 1);
        assert_eq!(summary.top_issues[0].count, 1);
        assert!(summary.summary.contains("Analyzed 1 reports"));
    }

    #[test]
    fn empty_input_yields_an_empty_summary() {
        let summary = aggregate(&[]);
        assert!(summary.top_issues.is_empty());
        assert_eq!(summary.source, GenerationSource::Fallback);
    }
}
