//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use campusflow_core::domain::Building;
use campusflow_core::insight::InsightGenerator;
use campusflow_core::ports::{ReportStore, TextGenerator};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Nothing in here is mutated after construction; requests stay
/// stateless with respect to each other.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub insight: InsightGenerator,
    pub buildings: Vec<Building>,
    pub config: Arc<Config>,
}
