//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. Handlers are thin adapters:
//! validate the request shape, call the port, translate error kinds.

use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use campusflow_core::alerts::{self, SPIKE_WINDOW_MINUTES};
use campusflow_core::classify;
use campusflow_core::domain::{Building, Report, ReportCategory, TrendAlert, TrendSummary};
use campusflow_core::ports::PortError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_report_handler,
        list_reports_handler,
        get_trends_handler,
        list_buildings_handler,
        list_alerts_handler,
    ),
    components(
        schemas(
            SubmitReportRequest,
            SubmitReportResponse,
            ReportResponse,
            TrendsResponse,
            TopIssueResponse,
            BuildingResponse,
            AlertResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "CampusFlow API", description = "API endpoints for campus issue reporting and trend insights.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request, Response and Error Payload Structs
//=========================================================================================

/// The JSON body accepted by `POST /report`.
///
/// Every field is optional in the shape so a missing field produces our
/// field-level validation error rather than a framework-level rejection.
#[derive(Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    pub building: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

/// The response payload sent after successfully storing a report.
#[derive(Serialize, ToSchema)]
pub struct SubmitReportResponse {
    report_id: String,
    timestamp: DateTime<Utc>,
}

/// One stored report, as returned by `GET /reports`.
#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    building: String,
    category: String,
    description: String,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            building: report.building,
            category: report.category.as_str().to_string(),
            description: report.description,
            timestamp: report.submitted_at,
            photo_url: report.photo_url,
        }
    }
}

/// The trend payload returned by `GET /trends`.
#[derive(Serialize, ToSchema)]
pub struct TrendsResponse {
    summary: String,
    top_issues: Vec<TopIssueResponse>,
    source: String,
    generated_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct TopIssueResponse {
    building: String,
    category: String,
    count: u64,
}

impl From<TrendSummary> for TrendsResponse {
    fn from(summary: TrendSummary) -> Self {
        Self {
            summary: summary.summary,
            top_issues: summary
                .top_issues
                .into_iter()
                .map(|issue| TopIssueResponse {
                    building: issue.building,
                    category: issue.category.as_str().to_string(),
                    count: issue.count,
                })
                .collect(),
            source: summary.source.as_str().to_string(),
            generated_at: summary.generated_at,
        }
    }
}

/// One building from the static reference data, as returned by `GET /buildings`.
#[derive(Serialize, ToSchema)]
pub struct BuildingResponse {
    id: String,
    name: String,
    lat: f64,
    lon: f64,
    status: String,
    amenities: Vec<String>,
}

impl From<Building> for BuildingResponse {
    fn from(building: Building) -> Self {
        Self {
            id: building.id,
            name: building.name,
            lat: building.lat,
            lon: building.lon,
            status: building.status.as_str().to_string(),
            amenities: building.amenities,
        }
    }
}

/// One spike alert, as returned by `GET /alerts`.
#[derive(Serialize, ToSchema)]
pub struct AlertResponse {
    building: String,
    category: String,
    count: u64,
    window_minutes: u32,
    severity: String,
}

impl From<TrendAlert> for AlertResponse {
    fn from(alert: TrendAlert) -> Self {
        Self {
            building: alert.building,
            category: alert.category.as_str().to_string(),
            count: alert.count,
            window_minutes: alert.window_minutes,
            severity: alert.severity,
        }
    }
}

/// The error body every failing endpoint returns.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

/// Maps a port error onto the externally visible status code and body.
/// Generation failures never reach this point; the insight generator
/// absorbs them before they can surface.
fn error_response(err: PortError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        PortError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message,
                field: Some(field),
            }),
        ),
        PortError::StoreUnavailable(message) => {
            error!(%message, "report store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "report store is temporarily unavailable, retry later".to_string(),
                    field: None,
                }),
            )
        }
        other => {
            error!(error = %other, "request failed unexpectedly");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                    field: None,
                }),
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Submit a new issue report.
///
/// The report is timestamped server-side; reports filed as `other` get one
/// AI classification attempt when enabled, degrading silently to `other`.
#[utoipa::path(
    post,
    path = "/report",
    request_body = SubmitReportRequest,
    responses(
        (status = 201, description = "Report stored successfully", body = SubmitReportResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 503, description = "Report store unavailable", body = ErrorResponse)
    )
)]
pub async fn submit_report_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SubmitReportRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let report = build_report(&app_state, payload)
        .await
        .map_err(error_response)?;

    app_state.store.put(&report).await.map_err(error_response)?;

    let response = SubmitReportResponse {
        report_id: report.report_id(),
        timestamp: report.submitted_at,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Validates the submission shape and produces a timestamped report.
async fn build_report(
    app_state: &AppState,
    payload: SubmitReportRequest,
) -> Result<Report, PortError> {
    let building = required_field("building", payload.building)?;
    let description = required_field("description", payload.description)?;
    let category_raw = required_field("category", payload.category)?;

    let mut category: ReportCategory =
        category_raw
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| PortError::Validation {
                field: "category",
                message: format!("'{category_raw}' is not a known category"),
            })?;

    if category == ReportCategory::Other && app_state.config.auto_classify {
        category = classify::classify(app_state.generator.as_ref(), &description).await;
    }

    Ok(Report {
        building,
        category,
        description,
        submitted_at: Utc::now(),
        photo_url: payload.photo_url,
    })
}

fn required_field(field: &'static str, value: Option<String>) -> Result<String, PortError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PortError::Validation {
            field,
            message: "is required".to_string(),
        }),
    }
}

#[derive(Deserialize, IntoParams)]
pub struct ListReportsQuery {
    /// Restrict the listing to one building id.
    pub building: Option<String>,
    /// UTC day in `YYYY-MM-DD` form; defaults to today.
    pub date: Option<String>,
}

/// List reports for one UTC day.
#[utoipa::path(
    get,
    path = "/reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Reports for the requested scope, oldest first", body = [ReportResponse]),
        (status = 400, description = "Malformed date filter", body = ErrorResponse),
        (status = 503, description = "Report store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_reports_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Vec<ReportResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let day = match &query.date {
        Some(raw) => raw.parse::<NaiveDate>().map_err(|_| {
            error_response(PortError::Validation {
                field: "date",
                message: format!("'{raw}' is not a YYYY-MM-DD date"),
            })
        })?,
        None => Utc::now().date_naive(),
    };

    let reports = app_state
        .store
        .list_day(day, query.building.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

#[derive(Deserialize, IntoParams)]
pub struct TrendsQuery {
    /// Restrict the trend analysis to one building id.
    pub building: Option<String>,
}

/// Get the trend summary for today's reports.
#[utoipa::path(
    get,
    path = "/trends",
    params(TrendsQuery),
    responses(
        (status = 200, description = "Trend summary for today", body = TrendsResponse),
        (status = 503, description = "Report store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_trends_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let today = Utc::now().date_naive();
    let reports = app_state
        .store
        .list_day(today, query.building.as_deref())
        .await
        .map_err(error_response)?;

    let summary = app_state.insight.summarize(&reports).await;
    Ok(Json(TrendsResponse::from(summary)))
}

/// List the static building reference data.
#[utoipa::path(
    get,
    path = "/buildings",
    responses(
        (status = 200, description = "All known buildings", body = [BuildingResponse])
    )
)]
pub async fn list_buildings_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<BuildingResponse>> {
    Json(
        app_state
            .buildings
            .iter()
            .cloned()
            .map(BuildingResponse::from)
            .collect(),
    )
}

/// List spike alerts over the trailing window.
#[utoipa::path(
    get,
    path = "/alerts",
    responses(
        (status = 200, description = "Spike alerts over the last 30 minutes", body = [AlertResponse]),
        (status = 503, description = "Report store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_alerts_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlertResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let cutoff = Utc::now() - Duration::minutes(SPIKE_WINDOW_MINUTES as i64);
    let reports = app_state
        .store
        .list_since(cutoff)
        .await
        .map_err(error_response)?;

    Ok(Json(
        alerts::detect_spikes(&reports)
            .into_iter()
            .map(AlertResponse::from)
            .collect(),
    ))
}
