use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::error::{parse_flag, SeasonError};
use super::service::SeasonService;
use super::store::SeasonRepository;
use super::views::SessionResultsResponse;

/// Router builder exposing the season read models and simulation endpoints.
pub fn season_router<R>(service: Arc<SeasonService<R>>) -> Router
where
    R: SeasonRepository + 'static,
{
    Router::new()
        .route("/api/v1/competitors", get(competitors_handler::<R>))
        .route("/api/v1/teams", get(teams_handler::<R>))
        .route("/api/v1/standings/teams", get(team_standings_handler::<R>))
        .route("/api/v1/calendar", get(calendar_handler::<R>))
        .route(
            "/api/v1/calendar/:index/results",
            get(session_results_handler::<R>),
        )
        .route(
            "/api/v1/simulate/session/:index",
            post(simulate_session_handler::<R>),
        )
        .route("/api/v1/simulate/next", post(simulate_next_handler::<R>))
        .route("/api/v1/season/reset", post(reset_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ForceQuery {
    force: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResetQuery {
    reset_skills: Option<String>,
}

pub(crate) async fn competitors_handler<R>(
    State(service): State<Arc<SeasonService<R>>>,
) -> Response
where
    R: SeasonRepository + 'static,
{
    match service.standings() {
        Ok(standings) => (StatusCode::OK, axum::Json(standings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn teams_handler<R>(State(service): State<Arc<SeasonService<R>>>) -> Response
where
    R: SeasonRepository + 'static,
{
    match service.teams() {
        Ok(teams) => (StatusCode::OK, axum::Json(teams)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn team_standings_handler<R>(
    State(service): State<Arc<SeasonService<R>>>,
) -> Response
where
    R: SeasonRepository + 'static,
{
    match service.team_standings() {
        Ok(standings) => (StatusCode::OK, axum::Json(standings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calendar_handler<R>(State(service): State<Arc<SeasonService<R>>>) -> Response
where
    R: SeasonRepository + 'static,
{
    match service.calendar() {
        Ok(sessions) => (StatusCode::OK, axum::Json(sessions)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_results_handler<R>(
    State(service): State<Arc<SeasonService<R>>>,
    Path(index): Path<String>,
) -> Response
where
    R: SeasonRepository + 'static,
{
    let outcome = parse_index(&index).and_then(|index| service.session_results(index));
    match outcome {
        Ok(results) => {
            (StatusCode::OK, axum::Json(SessionResultsResponse { results })).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn simulate_session_handler<R>(
    State(service): State<Arc<SeasonService<R>>>,
    Path(index): Path<String>,
    Query(query): Query<ForceQuery>,
) -> Response
where
    R: SeasonRepository + 'static,
{
    let outcome = parse_index(&index).and_then(|index| {
        let force = optional_flag("force", query.force.as_deref())?.unwrap_or(false);
        service.simulate_session(index, force)
    });
    match outcome {
        Ok(results) => {
            (StatusCode::OK, axum::Json(SessionResultsResponse { results })).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn simulate_next_handler<R>(
    State(service): State<Arc<SeasonService<R>>>,
    Query(query): Query<ForceQuery>,
) -> Response
where
    R: SeasonRepository + 'static,
{
    let outcome = optional_flag("force", query.force.as_deref())
        .and_then(|force| service.simulate_next(force.unwrap_or(false)));
    match outcome {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_handler<R>(
    State(service): State<Arc<SeasonService<R>>>,
    Query(query): Query<ResetQuery>,
) -> Response
where
    R: SeasonRepository + 'static,
{
    let outcome = optional_flag("reset_skills", query.reset_skills.as_deref())
        .and_then(|reset_skills| service.reset_season(reset_skills));
    match outcome {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn parse_index(raw: &str) -> Result<i64, SeasonError> {
    raw.trim().parse::<i64>().map_err(|_| {
        SeasonError::Validation(format!("session index must be an integer, got `{raw}`"))
    })
}

fn optional_flag(name: &str, raw: Option<&str>) -> Result<Option<bool>, SeasonError> {
    raw.map(|raw| parse_flag(name, raw)).transpose()
}

/// Map a season failure onto a status code and an `{"error": ...}` body.
pub(crate) fn error_response(error: SeasonError) -> Response {
    let status = error.status_code();

    if status.is_server_error() {
        error!(error = %error, "season request failed");
    } else {
        warn!(status = status.as_u16(), error = %error, "season request rejected");
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
