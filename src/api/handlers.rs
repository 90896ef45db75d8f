//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    animation::CanvasSize,
    engine::Command,
    error::AppError,
    state::{AppState, TimerEvent, TimerId, TimerSnapshot},
};
use super::responses::{
    AddTimerRequest, ApiResponse, AttachRequest, HealthResponse, LifecycleResponse, StatusResponse,
};

type ApiResult<T> = Result<Json<T>, AppError>;

/// Handle GET /timers - List all timers in row order
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TimerSnapshot>> {
    Ok(Json(state.list_timers()?))
}

/// Handle POST /timers - Add a timer that has not been started yet
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTimerRequest>,
) -> Result<(StatusCode, Json<TimerSnapshot>), AppError> {
    let timer = state.add_timer(request.hours, request.minutes, request.seconds)?;
    Ok((StatusCode::CREATED, Json(timer)))
}

/// Handle GET /timers/:id - Show one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<TimerSnapshot> {
    Ok(Json(state.get_timer(id)?))
}

/// Handle DELETE /timers/:id - Remove a timer and cancel its ticking
pub async fn remove_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    state.remove_timer(id)?;
    Ok(Json(ApiResponse::new("removed", format!("Timer {} removed", id), None)))
}

fn run_command(state: &AppState, id: TimerId, command: Command, action: &str) -> ApiResult<ApiResponse> {
    let outcome = state.command(id, command)?;
    if !outcome.accepted {
        warn!("Timer {} ignored {} while {}", id, action, outcome.timer.status_label);
    }
    Ok(Json(ApiResponse::from_outcome(action, outcome)))
}

/// Handle POST /timers/:id/toggle - The row button
pub async fn toggle_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult<ApiResponse> {
    run_command(&state, id, Command::Toggle, "toggle")
}

/// Handle POST /timers/:id/start
pub async fn start_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult<ApiResponse> {
    run_command(&state, id, Command::Start, "start")
}

/// Handle POST /timers/:id/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult<ApiResponse> {
    run_command(&state, id, Command::Pause, "pause")
}

/// Handle POST /timers/:id/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult<ApiResponse> {
    run_command(&state, id, Command::Resume, "resume")
}

/// Handle POST /timers/:id/restart
pub async fn restart_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult<ApiResponse> {
    run_command(&state, id, Command::Restart, "restart")
}

/// Handle POST /timers/:id/detach - The row scrolled out of view
pub async fn detach_handler(State(state): State<Arc<AppState>>, Path(id): Path<TimerId>) -> ApiResult<ApiResponse> {
    let outcome = state.detach_view(id)?;
    Ok(Json(ApiResponse::from_outcome("detach", outcome)))
}

/// Handle POST /timers/:id/attach - The row is shown again
pub async fn attach_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<AttachRequest>,
) -> ApiResult<ApiResponse> {
    let canvas = CanvasSize::new(request.width, request.height);
    let outcome = state.attach_view(id, canvas, request.thickness)?;
    Ok(Json(ApiResponse::from_outcome("attach", outcome)))
}

/// Handle POST /app/background - The app is about to lose focus
pub async fn background_handler(State(state): State<Arc<AppState>>) -> ApiResult<LifecycleResponse> {
    let suspended = state.enter_background()?;
    info!("Background endpoint called - {} timers suspended", suspended);
    Ok(Json(LifecycleResponse {
        status: "background".to_string(),
        timestamp: state.now(),
        suspended_timers: Some(suspended),
        gap_seconds: None,
    }))
}

/// Handle POST /app/foreground - The app is active again
pub async fn foreground_handler(State(state): State<Arc<AppState>>) -> ApiResult<LifecycleResponse> {
    let gap = state.enter_foreground()?;
    info!("Foreground endpoint called - {}s gap reconciled", gap);
    Ok(Json(LifecycleResponse {
        status: "foreground".to_string(),
        timestamp: state.now(),
        suspended_timers: None,
        gap_seconds: Some(gap),
    }))
}

/// Handle GET /events - Stream timer updates as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let updates = state.subscribe();

    let stream = stream::unfold(updates, |mut updates| async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    let event = Event::default().event(update.name());
                    let event = match &update {
                        TimerEvent::Updated(snapshot) => event.json_data(snapshot),
                        TimerEvent::Removed { id } => event.json_data(id),
                    };
                    return Some((event, updates));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} timer updates", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return every timer plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let timers = state.list_timers()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers,
        backgrounded: state.is_backgrounded(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
