//! crates/campusflow_core/src/insight.rs
//!
//! Builds trend summaries for a report set. A single attempt is made
//! against the text-generation port; any failure (timeout, service error,
//! unusable response) falls through to the deterministic aggregator.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::aggregate::{aggregate, group_counts, TOP_ISSUE_LIMIT};
use crate::domain::{GenerationSource, Report, TopIssue, TrendSummary};
use crate::ports::{PortError, PortResult, TextGenerator};

/// Most reports ever included in a single prompt.
const MAX_PROMPT_REPORTS: usize = 100;
/// Descriptions are clipped to this many characters inside the prompt.
const MAX_DESCRIPTION_CHARS: usize = 160;

const NO_REPORTS_NARRATIVE: &str = "No reports submitted today.";

/// Produces trend summaries, preferring the AI narrative and degrading to
/// the deterministic fallback on any failure.
#[derive(Clone)]
pub struct InsightGenerator {
    generator: Arc<dyn TextGenerator>,
}

/// The structured portion expected inside the model's response.
#[derive(Deserialize)]
struct GeneratedPayload {
    summary: String,
    #[serde(default)]
    top_issues: Vec<GeneratedIssue>,
}

#[derive(Deserialize)]
struct GeneratedIssue {
    building: String,
    category: String,
    count: u64,
}

impl InsightGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarizes a report set. Infallible by construction: the
    /// deterministic aggregator is always available, so every failure path
    /// still yields a well-formed summary in bounded time.
    pub async fn summarize(&self, reports: &[Report]) -> TrendSummary {
        if reports.is_empty() {
            return TrendSummary {
                summary: NO_REPORTS_NARRATIVE.to_string(),
                top_issues: Vec::new(),
                source: GenerationSource::Fallback,
                generated_at: Utc::now(),
            };
        }

        match self.generate(reports).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(error = %err, "trend generation failed, using fallback aggregation");
                aggregate(reports)
            }
        }
    }

    async fn generate(&self, reports: &[Report]) -> PortResult<TrendSummary> {
        let prompt = build_prompt(reports);
        let text = self.generator.generate(&prompt).await?;
        parse_generated(&text)
    }
}

fn build_prompt(reports: &[Report]) -> String {
    let (groups, _) = group_counts(reports);
    let counts: Vec<String> = groups
        .iter()
        .map(|group| format!("- {}/{}: {}", group.building, group.category, group.count))
        .collect();

    let lines: Vec<String> = reports
        .iter()
        .take(MAX_PROMPT_REPORTS)
        .map(|report| {
            let description: String = report.description.chars().take(MAX_DESCRIPTION_CHARS).collect();
            format!(
                "- Building: {}, Type: {}, Description: {}, Time: {}",
                report.building,
                report.category,
                description,
                report.submitted_at.to_rfc3339()
            )
        })
        .collect();

    format!(
        "You are analyzing campus facility reports. Summarize the key trends and issues.\n\n\
         Reports ({} total, showing up to {}):\n{}\n\n\
         Counts per building and category:\n{}\n\n\
         Format your response as JSON:\n\
         {{\n    \"summary\": \"2-3 sentence summary of today's trends across buildings\",\n    \
         \"top_issues\": [\n        {{\"building\": \"building_id\", \"category\": \"one of outlet|lighting|accessibility|cleanliness|other\", \"count\": number}}\n    ]\n}}\n\n\
         List at most {} top issues by frequency. Be factual and concise. Focus on actionable insights.",
        reports.len(),
        MAX_PROMPT_REPORTS,
        lines.join("\n"),
        counts.join("\n"),
        TOP_ISSUE_LIMIT,
    )
}

/// Extracts and validates the JSON object embedded in the model text.
/// Any non-conforming response is a generation failure; partial extraction
/// is never attempted, keeping the behavior deterministic.
fn parse_generated(text: &str) -> PortResult<TrendSummary> {
    let start = text
        .find('{')
        .ok_or_else(|| PortError::Generation("response contains no JSON object".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| PortError::Generation("response contains no JSON object".to_string()))?;

    let payload: GeneratedPayload = serde_json::from_str(&text[start..=end])
        .map_err(|err| PortError::Generation(format!("unparseable response: {err}")))?;

    if payload.summary.trim().is_empty() {
        return Err(PortError::Generation("response carried an empty summary".to_string()));
    }

    let mut top_issues = Vec::with_capacity(TOP_ISSUE_LIMIT);
    for issue in payload.top_issues.into_iter().take(TOP_ISSUE_LIMIT) {
        let category = issue.category.parse().map_err(|_| {
            PortError::Generation(format!("unknown category '{}' in response", issue.category))
        })?;
        top_issues.push(TopIssue {
            building: issue.building,
            category,
            count: issue.count,
        });
    }

    Ok(TrendSummary {
        summary: payload.summary,
        top_issues,
        source: GenerationSource::Ai,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportCategory;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned response, or a generation error when none is set,
    /// and counts how often it was asked.
    struct ScriptedGenerator {
        response: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Some(response.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Some(text) => Ok(text.clone()),
                None => Err(PortError::Generation("service down".to_string())),
            }
        }
    }

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

    fn sample_reports() -> Vec<Report> {
        vec![
            report("IKB", ReportCategory::Outlet, 0),
            report("IKB", ReportCategory::Outlet, 1),
            report("Library", ReportCategory::Lighting, 2),
        ]
    }

    #[tokio::test]
    async fn empty_input_never_calls_the_service() {
        let generator = ScriptedGenerator::ok("unused");
        let insight = InsightGenerator::new(generator.clone());

        let summary = insight.summarize(&[]).await;

        assert_eq!(summary.summary, NO_REPORTS_NARRATIVE);
        assert!(summary.top_issues.is_empty());
        assert_eq!(summary.source, GenerationSource::Fallback);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn service_failure_falls_back_to_aggregation() {
        let generator = ScriptedGenerator::failing();
        let insight = InsightGenerator::new(generator.clone());
        let reports = sample_reports();

        let got = insight.summarize(&reports).await;
        let expected = aggregate(&reports);

        assert_eq!(got.source, GenerationSource::Fallback);
        assert_eq!(got.top_issues, expected.top_issues);
        assert_eq!(got.summary, expected.summary);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn response_without_json_falls_back() {
        let generator = ScriptedGenerator::ok("Everything looks calm on campus today!");
        let insight = InsightGenerator::new(generator.clone());
        let reports = sample_reports();

        let got = insight.summarize(&reports).await;

        assert_eq!(got.source, GenerationSource::Fallback);
        assert_eq!(got.top_issues, aggregate(&reports).top_issues);
    }

    #[tokio::test]
    async fn response_with_unknown_category_falls_back() {
        let generator = ScriptedGenerator::ok(
            r#"{"summary": "Plumbing trouble.", "top_issues": [{"building": "IKB", "category": "plumbing", "count": 2}]}"#,
        );
        let insight = InsightGenerator::new(generator);
        let reports = sample_reports();

        let got = insight.summarize(&reports).await;

        assert_eq!(got.source, GenerationSource::Fallback);
    }

    #[tokio::test]
    async fn response_with_missing_fields_falls_back() {
        let generator = ScriptedGenerator::ok("{}");
        let insight = InsightGenerator::new(generator);

        let got = insight.summarize(&sample_reports()).await;

        assert_eq!(got.source, GenerationSource::Fallback);
    }

    #[tokio::test]
    async fn well_formed_response_is_used_verbatim() {
        let generator = ScriptedGenerator::ok(
            "Here is the analysis you asked for:\n\
             {\"summary\": \"Outlets at IKB dominate today.\", \"top_issues\": [\
             {\"building\": \"IKB\", \"category\": \"outlet\", \"count\": 2},\
             {\"building\": \"Library\", \"category\": \"lighting\", \"count\": 1}]}\n\
             Hope that helps.",
        );
        let insight = InsightGenerator::new(generator.clone());

        let got = insight.summarize(&sample_reports()).await;

        assert_eq!(got.source, GenerationSource::Ai);
        assert_eq!(got.summary, "Outlets at IKB dominate today.");
        assert_eq!(got.top_issues.len(), 2);
        assert_eq!(got.top_issues[0].building, "IKB");
        assert_eq!(got.top_issues[0].category, ReportCategory::Outlet);
        assert_eq!(got.top_issues[0].count, 2);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn response_issues_are_capped_at_the_limit() {
        let generator = ScriptedGenerator::ok(
            r#"{"summary": "Busy day.", "top_issues": [
                {"building": "A", "category": "outlet", "count": 4},
                {"building": "B", "category": "lighting", "count": 3},
                {"building": "C", "category": "cleanliness", "count": 2},
                {"building": "D", "category": "accessibility", "count": 1}]}"#,
        );
        let insight = InsightGenerator::new(generator);

        let got = insight.summarize(&sample_reports()).await;

        assert_eq!(got.source, GenerationSource::Ai);
        assert_eq!(got.top_issues.len(), TOP_ISSUE_LIMIT);
    }
}
