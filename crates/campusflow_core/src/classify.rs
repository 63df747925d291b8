//! crates/campusflow_core/src/classify.rs
//!
//! AI classification for reports submitted without a specific category.
//! Failure is never surfaced: an unclassifiable report stays `other`.

use tracing::debug;

use crate::domain::ReportCategory;
use crate::ports::TextGenerator;

/// Asks the text generator to pick a category for a free-text description.
/// Returns `Other` on any failure or non-category answer, so intake never
/// blocks on the external service.
pub async fn classify(generator: &dyn TextGenerator, description: &str) -> ReportCategory {
    let prompt = format!(
        "Classify this campus facility report into one of these categories:\n\
         - outlet (electrical outlets, charging stations)\n\
         - lighting (lights, lamps, dark areas)\n\
         - accessibility (wheelchair access, elevators, ramps)\n\
         - cleanliness (spills, trash, washrooms)\n\
         - other (anything else)\n\n\
         Report: \"{description}\"\n\n\
         Respond with ONLY the category name (one word)."
    );

    match generator.generate(&prompt).await {
        Ok(answer) => answer
            .trim()
            .to_lowercase()
            .parse()
            .unwrap_or(ReportCategory::Other),
        Err(err) => {
            debug!(error = %err, "classification failed, keeping 'other'");
            ReportCategory::Other
        }
    }
}
