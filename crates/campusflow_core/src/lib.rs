pub mod aggregate;
pub mod alerts;
pub mod classify;
pub mod domain;
pub mod insight;
pub mod ports;

pub use aggregate::aggregate;
pub use alerts::detect_spikes;
pub use domain::{
    Building, BuildingStatus, GenerationSource, Report, ReportCategory, TopIssue, TrendAlert,
    TrendSummary,
};
pub use insight::InsightGenerator;
pub use ports::{PortError, PortResult, ReportStore, TextGenerator};
