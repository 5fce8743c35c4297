mod analysis;
mod catalog;
mod domain;
mod error;
mod excel;
mod formulas;
mod progress;
mod server;
mod strength;
mod telegram;
mod volume;
mod watcher;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tokio::sync::{RwLock, broadcast};

use crate::analysis::{AnalysisSettings, analyze_workout_log};
use crate::domain::Sex;
use crate::excel::load_workout_log;
use crate::formulas::round1;
use crate::server::{AnalysisData, AppState, WsMessage};
use crate::strength::{DEFAULT_FEMALE_BENCHMARK_SCALE, ScoringConfig};
use crate::volume::{DEFAULT_WEEKLY_SET_TARGET, ring_fraction};
use crate::watcher::{ReloadConfig, watch_workbook};

/// Strength-scoring dashboard for a personal workout log.
#[derive(Parser, Debug)]
#[command(name = "liftscore")]
#[command(about = "Personal strength scores, phase progress, and weekly volume from a workout log")]
#[command(version)]
struct Args {
    /// Path to the Excel workbook containing the workout log.
    /// Can also be set via LIFTSCORE_FILE environment variable.
    #[arg(value_name = "FILE", env = "LIFTSCORE_FILE")]
    file: PathBuf,

    /// Port number for the web server.
    /// Can also be set via LIFTSCORE_PORT environment variable.
    #[arg(value_name = "PORT", env = "LIFTSCORE_PORT", default_value = "8080")]
    port: u16,

    /// Lifter sex, used to scale elite benchmarks.
    #[arg(long, value_enum, default_value = "male")]
    sex: Sex,

    /// Scale applied to elite benchmarks for female lifters.
    #[arg(long, default_value_t = DEFAULT_FEMALE_BENCHMARK_SCALE)]
    female_scale: f64,

    /// Weekly set target per muscle group.
    #[arg(long, default_value_t = DEFAULT_WEEKLY_SET_TARGET)]
    weekly_target: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Get canonical file path for watching
    let file_path = args
        .file
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", args.file.display()))?;

    let settings = AnalysisSettings {
        sex: args.sex,
        scoring: ScoringConfig {
            female_benchmark_scale: args.female_scale,
        },
        weekly_target: args.weekly_target,
    };

    // Load initial workout log
    println!("Loading workout log from: {}", file_path.display());
    let initial_data = load_and_analyze(&file_path, &settings)?;

    // Create broadcast channel for WebSocket notifications
    let (ws_tx, _) = broadcast::channel::<WsMessage>(16);

    // Build application state
    let state = Arc::new(AppState {
        data: RwLock::new(initial_data),
        file_path: file_path.clone(),
        settings,
        ws_broadcast: ws_tx,
    });

    // Determine static directory (relative to executable or cwd)
    let static_dir = find_static_dir()?;
    println!();
    println!("Static files: {}", static_dir.display());

    // Spawn file watcher
    let watcher_state = state.clone();
    let watcher_path = file_path.clone();
    tokio::spawn(async move {
        let config = ReloadConfig::default();
        let retry_config = config.clone();

        if let Err(e) = watch_workbook(&watcher_path, config, move || {
            let state = watcher_state.clone();
            let config = retry_config.clone();
            tokio::spawn(async move {
                reload_with_retry(&state, &config).await;
            });
        })
        .await
        {
            log::error!("File watcher error: {}", e);
        }
    });

    // Spawn Telegram bot when a token is configured
    if std::env::var("TELOXIDE_TOKEN").is_ok() {
        println!("Telegram bot enabled");
        tokio::spawn(telegram::start_bot(state.clone()));
    }

    // Start server
    println!();
    println!("Live reload enabled - watching for file changes");
    server::run_server(state, args.port, static_dir).await?;

    Ok(())
}

/// Loads the workout log and runs analysis, returning AnalysisData.
fn load_and_analyze(file_path: &PathBuf, settings: &AnalysisSettings) -> Result<AnalysisData> {
    let log = load_workout_log(file_path)
        .with_context(|| format!("Failed to load workout log from {}", file_path.display()))?;

    // Print summary
    println!();
    println!("=== Workout Log Summary ===");
    println!();
    println!("Total sets: {}", log.total_sets());

    if let Some((min_date, max_date)) = log.overall_date_range() {
        println!("Date range: {} to {}", min_date, max_date);
    }

    let today = Local::now().date_naive();
    let analysis = analyze_workout_log(
        &log,
        settings.sex,
        &settings.scoring,
        settings.weekly_target,
        today,
    );

    println!();

    // Per-exercise stats
    for stats in &analysis.exercises {
        let score = stats
            .score
            .map(|s| format!("{:3} {}", s.score, s.band().label()))
            .unwrap_or_else(|| "  ? (no bodyweight)".to_string());
        println!(
            "{:20} {:4} sets  e1RM {:6.1}kg  {}",
            stats.exercise.name,
            stats.total_sets,
            round1(stats.best_one_rm),
            score
        );
    }

    if let Some(bodyweight) = analysis.bodyweight_kg {
        println!();
        println!("Bodyweight: {}kg", bodyweight);
    }

    if let Some(summary) = &analysis.phase {
        println!();
        println!("=== Current Phase ===");
        println!("Started: {}", summary.phase.start_date);
        if let Some(time) = summary.progress.time {
            println!("Time progress: {:.0}%", time * 100.0);
        }
        if let Some(weight) = summary.progress.weight {
            println!("Weight progress: {:.0}%", weight * 100.0);
        }
    }

    println!();
    println!("=== Week of {} ===", analysis.week_start);
    for group in &analysis.weekly_volume {
        println!(
            "{:10} {:2}/{} sets ({:.0}%)",
            group.muscle_group.display_name(),
            group.count,
            analysis.weekly_target,
            ring_fraction(group.count, analysis.weekly_target) * 100.0
        );
    }

    Ok(AnalysisData {
        log,
        analysis,
        last_reload: Utc::now(),
    })
}

/// Reloads data with retry logic for transient failures.
async fn reload_with_retry(state: &AppState, config: &ReloadConfig) {
    let mut last_error = None;

    for attempt in 0..config.retry_attempts {
        match load_and_analyze(&state.file_path, &state.settings) {
            Ok(new_data) => {
                // Update state
                let mut data = state.data.write().await;
                *data = new_data;
                drop(data);

                log::info!("Data reloaded successfully");

                // Notify WebSocket clients
                let _ = state.ws_broadcast.send(WsMessage::DataUpdated);
                return;
            }
            Err(e) => {
                log::warn!("Reload attempt {} failed: {}", attempt + 1, e);
                last_error = Some(e);
                tokio::time::sleep(config.retry_delay).await;
            }
        }
    }

    // All retries failed
    if let Some(e) = last_error {
        log::error!(
            "Failed to reload data after {} attempts: {}",
            config.retry_attempts,
            e
        );

        // Notify clients of error
        let _ = state
            .ws_broadcast
            .send(WsMessage::Error("Failed to reload data".into()));
    }
}

/// Finds the static directory for serving frontend files.
fn find_static_dir() -> Result<PathBuf> {
    // Try relative to current working directory
    let cwd_static = PathBuf::from("static");
    if cwd_static.is_dir() {
        return Ok(cwd_static);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let exe_static = exe_dir.join("static");
        if exe_static.is_dir() {
            return Ok(exe_static);
        }
    }

    // Default to cwd/static (will be created)
    Ok(cwd_static)
}
