//! Web server for the strength-scoring dashboard.
//!
//! Provides a REST API for exercise scores, phase progress, and weekly
//! volume, a WebSocket for live updates, and static file serving for
//! the frontend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tower_http::services::ServeDir;

use crate::analysis::{AnalysisSettings, ExerciseStats, LogAnalysis};
use crate::catalog;
use crate::domain::WorkoutLog;
use crate::formulas::{round1, round2};
use crate::volume::ring_fraction;

/// Message types for WebSocket broadcast.
#[derive(Clone, Debug)]
pub enum WsMessage {
    /// Data has been reloaded successfully.
    DataUpdated,
    /// An error occurred during reload.
    Error(String),
}

/// Mutable analysis data that can be reloaded.
pub struct AnalysisData {
    pub log: WorkoutLog,
    pub analysis: LogAnalysis,
    pub last_reload: chrono::DateTime<Utc>,
}

/// Shared application state with reloadable data.
pub struct AppState {
    /// The analysis data, protected by RwLock for concurrent reads.
    pub data: RwLock<AnalysisData>,
    /// Path to the workbook for reloading and bot writes.
    pub file_path: PathBuf,
    /// Settings used to recompute the analysis on reload.
    pub settings: AnalysisSettings,
    /// Broadcast channel for WebSocket notifications.
    pub ws_broadcast: broadcast::Sender<WsMessage>,
}

// === JSON Response Types ===

#[derive(Serialize)]
pub struct SummaryResponse {
    pub total_sets: usize,
    pub exercises_with_data: usize,
    pub first_entry: Option<String>,
    pub last_entry: Option<String>,
    pub bodyweight_kg: Option<f64>,
    pub last_reload: String,
}

#[derive(Serialize)]
pub struct ScoreJson {
    pub score: u8,
    pub band: String,
    pub scaled_benchmark: f64,
}

#[derive(Serialize)]
pub struct ExerciseSummary {
    pub id: String,
    pub name: String,
    pub muscle_group: String,
    pub has_data: bool,
    pub total_sets: usize,
    pub best_one_rm: Option<f64>,
    pub last_set: Option<String>,
    pub score: Option<ScoreJson>,
}

#[derive(Serialize)]
pub struct BestSetJson {
    pub date: String,
    pub weight_kg: f64,
    pub reps: u32,
}

#[derive(Serialize)]
pub struct DataPointJson {
    pub date: String,
    pub value: f64,
}

#[derive(Serialize)]
pub struct ExerciseResponse {
    pub id: String,
    pub name: String,
    pub muscle_group: String,
    pub one_rm_history: Vec<DataPointJson>,
    pub best_one_rm: Option<f64>,
    pub best_set: Option<BestSetJson>,
    pub max_reps: Option<u32>,
    pub total_sets: usize,
    pub score: Option<ScoreJson>,
}

#[derive(Serialize)]
pub struct VolumeGroupJson {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub ring_fraction: f64,
}

#[derive(Serialize)]
pub struct VolumeResponse {
    pub week_start: String,
    pub weekly_target: u32,
    pub groups: Vec<VolumeGroupJson>,
}

#[derive(Serialize)]
pub struct PhaseJson {
    pub start_date: String,
    pub end_date: Option<String>,
    pub starting_weight_kg: f64,
    pub weight_goal_kg: Option<f64>,
    pub time_progress: Option<f64>,
    pub weight_progress: Option<f64>,
}

#[derive(Serialize)]
pub struct ProgressResponse {
    pub phase: Option<PhaseJson>,
    pub bodyweight_kg: Option<f64>,
}

// === Router Setup ===

/// Creates the application router.
pub fn create_router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/summary", get(get_summary))
        .route("/api/exercises", get(get_exercises))
        .route("/api/exercise/{id}", get(get_exercise))
        .route("/api/volume", get(get_volume))
        .route("/api/progress", get(get_progress))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .with_state(state)
}

// === WebSocket Handler ===

/// WebSocket upgrade handler for live updates.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws_connection(socket, state))
}

/// Handles an individual WebSocket connection.
async fn handle_ws_connection(mut socket: WebSocket, state: Arc<AppState>) {
    log::info!("WebSocket client connected");

    let mut rx = state.ws_broadcast.subscribe();

    loop {
        tokio::select! {
            // Forward broadcast messages to client
            msg = rx.recv() => {
                match msg {
                    Ok(WsMessage::DataUpdated) => {
                        if socket.send(Message::Text("reload".into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(WsMessage::Error(err)) => {
                        let msg = format!("error:{}", err);
                        if socket.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // Missed some messages, send a reload anyway
                        if socket.send(Message::Text("reload".into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
            // Handle client messages (ping/pong, close)
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    log::info!("WebSocket client disconnected");
}

/// Runs the web server.
pub async fn run_server(
    state: Arc<AppState>,
    port: u16,
    static_dir: PathBuf,
) -> anyhow::Result<()> {
    let app = create_router(state, static_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("Server running at http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === API Handlers ===

/// GET /api/summary - Snapshot overview.
async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    let data = state.data.read().await;
    let range = data.log.overall_date_range();

    Json(SummaryResponse {
        total_sets: data.log.total_sets(),
        exercises_with_data: data.analysis.exercises.len(),
        first_entry: range.map(|(min, _)| min.to_string()),
        last_entry: range.map(|(_, max)| max.to_string()),
        bodyweight_kg: data.analysis.bodyweight_kg,
        last_reload: data.last_reload.to_rfc3339(),
    })
}

/// GET /api/exercises - All catalog exercises with summary and score.
async fn get_exercises(State(state): State<Arc<AppState>>) -> Json<Vec<ExerciseSummary>> {
    let data = state.data.read().await;

    let summaries: Vec<ExerciseSummary> = catalog::all()
        .iter()
        .map(|exercise| {
            let stats = data
                .analysis
                .exercises
                .iter()
                .find(|s| std::ptr::eq(s.exercise, exercise));

            ExerciseSummary {
                id: exercise.id(),
                name: exercise.name.to_string(),
                muscle_group: exercise.muscle_group.display_name().to_string(),
                has_data: stats.is_some(),
                total_sets: stats.map(|s| s.total_sets).unwrap_or(0),
                best_one_rm: stats.map(|s| round1(s.best_one_rm)),
                last_set: stats.map(|s| s.last_set_date.to_string()),
                score: stats.and_then(score_json),
            }
        })
        .collect();

    Json(summaries)
}

/// GET /api/exercise/:id - Full data for one exercise.
async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExerciseResponse>, StatusCode> {
    let exercise = catalog::find(&id).ok_or(StatusCode::NOT_FOUND)?;
    let data = state.data.read().await;

    let stats = data
        .analysis
        .exercises
        .iter()
        .find(|s| std::ptr::eq(s.exercise, exercise));

    let response = match stats {
        Some(s) => ExerciseResponse {
            id: exercise.id(),
            name: exercise.name.to_string(),
            muscle_group: exercise.muscle_group.display_name().to_string(),
            one_rm_history: s
                .one_rm_history
                .iter()
                .map(|p| DataPointJson {
                    date: p.date.to_string(),
                    value: round1(p.value),
                })
                .collect(),
            best_one_rm: Some(round1(s.best_one_rm)),
            best_set: Some(BestSetJson {
                date: s.best_set.date.to_string(),
                weight_kg: s.best_set.weight_kg,
                reps: s.best_set.reps,
            }),
            max_reps: Some(s.max_reps),
            total_sets: s.total_sets,
            score: score_json(s),
        },
        None => ExerciseResponse {
            id: exercise.id(),
            name: exercise.name.to_string(),
            muscle_group: exercise.muscle_group.display_name().to_string(),
            one_rm_history: Vec::new(),
            best_one_rm: None,
            best_set: None,
            max_reps: None,
            total_sets: 0,
            score: None,
        },
    };

    Ok(Json(response))
}

/// GET /api/volume - Weekly set counts per muscle group.
async fn get_volume(State(state): State<Arc<AppState>>) -> Json<VolumeResponse> {
    let data = state.data.read().await;
    let analysis = &data.analysis;

    let groups = analysis
        .weekly_volume
        .iter()
        .map(|g| VolumeGroupJson {
            id: g.muscle_group.id().to_string(),
            name: g.muscle_group.display_name().to_string(),
            sets: g.count,
            ring_fraction: ring_fraction(g.count, analysis.weekly_target),
        })
        .collect();

    Json(VolumeResponse {
        week_start: analysis.week_start.to_string(),
        weekly_target: analysis.weekly_target,
        groups,
    })
}

/// GET /api/progress - Current phase progress.
async fn get_progress(State(state): State<Arc<AppState>>) -> Json<ProgressResponse> {
    let data = state.data.read().await;
    let analysis = &data.analysis;

    let phase = analysis.phase.as_ref().map(|summary| PhaseJson {
        start_date: summary.phase.start_date.to_string(),
        end_date: summary.phase.end_date.map(|d| d.to_string()),
        starting_weight_kg: summary.phase.starting_weight_kg,
        weight_goal_kg: summary.phase.weight_goal_kg,
        time_progress: summary.progress.time,
        weight_progress: summary.progress.weight,
    });

    Json(ProgressResponse {
        phase,
        bodyweight_kg: analysis.bodyweight_kg,
    })
}

// === Helper Functions ===

fn score_json(stats: &ExerciseStats) -> Option<ScoreJson> {
    stats.score.map(|s| ScoreJson {
        score: s.score,
        band: s.band().label().to_string(),
        scaled_benchmark: round2(s.scaled_benchmark),
    })
}
