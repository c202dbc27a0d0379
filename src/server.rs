// src/server.rs
//
// Axum surface: request/response shapes, the router and the mapping from
// the domain error taxonomy onto HTTP statuses. All domain validation
// happens here on the server side; client-side pre-validation is not
// trusted.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::absence::{AbsenceLedger, AbsenceOutcome, AbsenceRangeReport, AbsenceTotals, PopulatedAbsence};
use crate::day_view::{AbsenceSummary, DayGrid, DayViewService};
use crate::grid::{AssignSpec, AssignmentGrid, PopulatedAssignment};
use crate::plan::{parse_day, AbsenceType, Color, Employee, PlanError, Shift, SlotKey};
use crate::roster::RosterService;
use crate::store::PlanStore;

#[derive(Clone)]
pub struct AppState {
    pub roster: RosterService,
    pub ledger: AbsenceLedger,
    pub grid: AssignmentGrid,
    pub day_view: DayViewService,
    pub store: Arc<PlanStore>,
}

impl AppState {
    pub fn new(store: Arc<PlanStore>) -> Self {
        Self {
            roster: RosterService::new(store.clone()),
            ledger: AbsenceLedger::new(store.clone()),
            grid: AssignmentGrid::new(store.clone()),
            day_view: DayViewService::new(store.clone()),
            store,
        }
    }
}

// --- Error mapping ---

pub struct ApiError(pub PlanError);

impl From<PlanError> for ApiError {
    fn from(e: PlanError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        let status = match &self.0 {
            PlanError::MissingField(_)
            | PlanError::UnknownRole(_)
            | PlanError::UnknownShift(_)
            | PlanError::UnknownAbsenceType(_)
            | PlanError::UnknownColor(_)
            | PlanError::BadDate(_)
            | PlanError::BadMonth(_)
            | PlanError::RangeInverted { .. }
            | PlanError::NothingToAssign
            | PlanError::ForbiddenPosition { .. } => StatusCode::BAD_REQUEST,
            PlanError::EmployeeNotFound { .. } => StatusCode::NOT_FOUND,
            PlanError::NameTaken { .. } | PlanError::SickDay { .. } => StatusCode::CONFLICT,
            PlanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// --- Request shapes ---

#[derive(Debug, Deserialize)]
pub struct EmployeePayload {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub date: String,
    pub shift: String,
    #[serde(default)]
    pub line: Option<String>,
    pub position: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnassignQuery {
    pub date: String,
    pub shift: String,
    #[serde(default)]
    pub line: Option<String>,
    pub position: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsencePayload {
    pub employee_id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRangePayload {
    pub employee_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct MonthQuery {
    #[serde(default)]
    pub ym: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanResponse {
    pub grid: DayGrid,
    pub absences: AbsenceSummary,
}

/// "NONE" is the request-level sentinel for clearing a day.
fn parse_kind(s: &str) -> Result<Option<AbsenceType>, PlanError> {
    if s == "NONE" {
        Ok(None)
    } else {
        AbsenceType::parse(s).map(Some)
    }
}

// --- Router ---

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/employees", get(list_employees).post(add_employee))
        .route(
            "/employees/{id}",
            axum::routing::put(update_employee).delete(delete_employee),
        )
        .route(
            "/schedules",
            get(list_schedule).post(assign_slot).delete(unassign_slot),
        )
        .route("/schedules/grid", get(day_plan))
        .route("/absences", get(list_absences).post(set_absence))
        .route("/urlaub", post(set_absence))
        .route("/absences/range", post(fill_absence_range))
        .route("/absences/totals/{id}", get(absence_totals))
        .route("/status", get(handle_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Handlers ---

async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(state.roster.list_employees()?))
}

async fn add_employee(
    State(state): State<AppState>,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.roster.add_employee(&payload.name, &payload.role)?))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(
        state
            .roster
            .update_employee(&id, &payload.name, &payload.role)?,
    ))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.roster.delete_employee(&id)?;
    Ok(Json(json!({ "success": true })))
}

async fn list_schedule(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<PopulatedAssignment>>, ApiError> {
    let date = parse_day(&query.date)?;
    Ok(Json(state.grid.query(date)?))
}

async fn assign_slot(
    State(state): State<AppState>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<PopulatedAssignment>, ApiError> {
    let spec = AssignSpec {
        date: parse_day(&payload.date)?,
        shift: Shift::parse(&payload.shift)?,
        line: payload.line.unwrap_or_default(),
        position: payload.position,
        employee_id: payload.employee_id,
        custom_name: payload.custom_name,
        color: payload
            .color
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(Color::parse)
            .transpose()?,
    };
    Ok(Json(state.grid.assign(spec)?))
}

async fn unassign_slot(
    State(state): State<AppState>,
    Query(query): Query<UnassignQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let key = SlotKey {
        date: parse_day(&query.date)?,
        shift: Shift::parse(&query.shift)?,
        line: query.line.unwrap_or_default(),
        position: query.position,
    };
    match state.grid.unassign(&key)? {
        Some(removed) => Ok(Json(serde_json::to_value(removed).map_err(|e| {
            PlanError::Storage(format!("response serialization failed: {}", e))
        })?)),
        None => Ok(Json(json!({ "success": true }))),
    }
}

async fn day_plan(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DayPlanResponse>, ApiError> {
    let date = parse_day(&query.date)?;
    Ok(Json(DayPlanResponse {
        grid: state.day_view.build_day_grid(date),
        absences: state.day_view.build_absence_summary(date),
    }))
}

async fn list_absences(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<PopulatedAbsence>>, ApiError> {
    let ym = query.ym.unwrap_or_default();
    Ok(Json(state.ledger.list_absences(&ym)?))
}

async fn set_absence(
    State(state): State<AppState>,
    Json(payload): Json<AbsencePayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = parse_day(&payload.date)?;
    let kind = parse_kind(&payload.kind)?;
    match state.ledger.set_absence(&payload.employee_id, date, kind)? {
        AbsenceOutcome::Saved(absence) => {
            Ok(Json(serde_json::to_value(absence).map_err(|e| {
                PlanError::Storage(format!("response serialization failed: {}", e))
            })?))
        }
        AbsenceOutcome::Removed => Ok(Json(json!({ "ok": true, "removed": true }))),
    }
}

async fn fill_absence_range(
    State(state): State<AppState>,
    Json(payload): Json<AbsenceRangePayload>,
) -> Result<Json<AbsenceRangeReport>, ApiError> {
    let start = parse_day(&payload.start_date)?;
    let end = parse_day(&payload.end_date)?;
    let kind = parse_kind(&payload.kind)?;
    Ok(Json(state.ledger.set_absence_range(
        &payload.employee_id,
        start,
        end,
        kind,
    )?))
}

async fn absence_totals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AbsenceTotals>, ApiError> {
    Ok(Json(state.ledger.totals(&id)?))
}

async fn handle_status(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (employees, absences, assignments) = state.store.counts()?;
    Ok(Json(json!({
        "time": chrono::Local::now().to_rfc3339(),
        "employees": employees,
        "absences": absences,
        "assignments": assignments,
    })))
}
