pub mod buildings;
pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary
// that builds the web server router.
pub use rest::{
    get_trends_handler, list_alerts_handler, list_buildings_handler, list_reports_handler,
    submit_report_handler,
};
