//! Audit query endpoints.

use std::sync::Arc;

use audit::{AuditFilter, AuditReport, AuditStatistics, MAX_PAGE_SIZE};
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, NaiveDate, Utc};
use common::AggregateId;
use event_store::{EventStore, StoredEvent};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

/// Response type for a stored audit record.
#[derive(Serialize)]
pub struct StoredEventResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub version: i64,
    pub occurred_on: String,
    pub created_at: String,
    pub user_id: String,
    pub user_name: String,
    pub origin: String,
    pub user_agent: String,
    pub payload: serde_json::Value,
    pub metadata: serde_json::Value,
}

impl From<StoredEvent> for StoredEventResponse {
    fn from(e: StoredEvent) -> Self {
        Self {
            event_id: e.event_id.to_string(),
            event_type: e.event_type,
            aggregate_id: e.aggregate_id.to_string(),
            aggregate_type: e.aggregate_type,
            version: e.version.as_i64(),
            occurred_on: e.occurred_on.to_rfc3339(),
            created_at: e.created_at.to_rfc3339(),
            user_id: e.actor.user_id,
            user_name: e.actor.user_name,
            origin: e.actor.origin,
            user_agent: e.actor.user_agent,
            payload: e.payload,
            metadata: serde_json::json!(e.metadata),
        }
    }
}

fn to_responses(events: Vec<StoredEvent>) -> Json<Vec<StoredEventResponse>> {
    Json(events.into_iter().map(StoredEventResponse::from).collect())
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_datetime(value: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid date/time value: {value}"
    )))
}

fn parse_optional(value: Option<&String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    value.map(|v| parse_datetime(v)).transpose()
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: usize,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub desde: Option<String>,
    pub hasta: Option<String>,
}

/// GET /eventos — paginated raw event list.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<StoredEventResponse>>, ApiError> {
    let take = page.take.unwrap_or(MAX_PAGE_SIZE);
    let events = state.audit.events(page.skip, take).await?;
    Ok(to_responses(events))
}

/// GET /eventos/tipo/{tipo} — filter by event-type substring and optional
/// time window.
#[tracing::instrument(skip(state))]
pub async fn by_type<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(tipo): Path<String>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<Vec<StoredEventResponse>>, ApiError> {
    let mut filter = AuditFilter::new().event_type(tipo);
    if let Some(from) = parse_optional(window.desde.as_ref())? {
        filter = filter.from(from);
    }
    if let Some(to) = parse_optional(window.hasta.as_ref())? {
        filter = filter.to(to);
    }

    let events = state.audit.search(filter).await?;
    Ok(to_responses(events))
}

/// GET /eventos/usuario/{usuario_id} — filter by acting user.
#[tracing::instrument(skip(state))]
pub async fn by_user<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(usuario_id): Path<String>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<Vec<StoredEventResponse>>, ApiError> {
    let mut filter = AuditFilter::new().user_id(usuario_id);
    if let Some(from) = parse_optional(window.desde.as_ref())? {
        filter = filter.from(from);
    }
    if let Some(to) = parse_optional(window.hasta.as_ref())? {
        filter = filter.to(to);
    }

    let events = state.audit.search(filter).await?;
    Ok(to_responses(events))
}

/// GET /eventos/agregado/{agregado_id} — full ordered history for one
/// aggregate.
#[tracing::instrument(skip(state))]
pub async fn by_aggregate<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(agregado_id): Path<String>,
) -> Result<Json<Vec<StoredEventResponse>>, ApiError> {
    let events = state
        .audit
        .aggregate_history(&AggregateId::new(agregado_id))
        .await?;
    Ok(to_responses(events))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub horas: Option<i64>,
}

/// GET /eventos/recientes — events in the last N hours (clamped to a week).
#[tracing::instrument(skip(state))]
pub async fn recent<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<StoredEventResponse>>, ApiError> {
    let events = state.audit.recent(query.horas.unwrap_or(24)).await?;
    Ok(to_responses(events))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub desde: String,
    pub hasta: String,
}

/// GET /reporte — aggregate report over an explicit window.
#[tracing::instrument(skip(state))]
pub async fn report<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<AuditReport>, ApiError> {
    let from = parse_datetime(&query.desde)?;
    let to = parse_datetime(&query.hasta)?;
    let report = state.audit.report(from, to).await?;
    Ok(Json(report))
}

/// GET /estadisticas — derived activity summary.
#[tracing::instrument(skip(state))]
pub async fn statistics<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<AuditStatistics>, ApiError> {
    let stats = state.audit.statistics().await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub tipo: Option<String>,
    pub usuario_id: Option<String>,
    pub agregado_id: Option<String>,
    pub desde: Option<String>,
    pub hasta: Option<String>,
    #[serde(default)]
    pub skip: usize,
    pub take: Option<usize>,
}

/// POST /buscar — composite filter search.
#[tracing::instrument(skip(state, request))]
pub async fn search<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<StoredEventResponse>>, ApiError> {
    let mut filter = AuditFilter::new()
        .skip(request.skip)
        .take(request.take.unwrap_or(MAX_PAGE_SIZE));

    if let Some(tipo) = request.tipo {
        filter = filter.event_type(tipo);
    }
    if let Some(usuario_id) = request.usuario_id {
        filter = filter.user_id(usuario_id);
    }
    if let Some(agregado_id) = request.agregado_id {
        filter = filter.aggregate_id(AggregateId::new(agregado_id));
    }
    if let Some(from) = parse_optional(request.desde.as_ref())? {
        filter = filter.from(from);
    }
    if let Some(to) = parse_optional(request.hasta.as_ref())? {
        filter = filter.to(to);
    }

    let events = state.audit.search(filter).await?;
    Ok(to_responses(events))
}
