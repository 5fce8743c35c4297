use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use teloxide::{
    dispatching::UpdateFilterExt,
    dptree,
    prelude::*,
    utils::command::{BotCommands, ParseError},
};
use umya_spreadsheet::*;

use crate::catalog;
use crate::formulas::round1;
use crate::server::AppState;
use crate::volume::ring_fraction;

pub(crate) async fn start_bot(state: Arc<AppState>) {
    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .branch(dptree::entry().filter_command::<Command>().endpoint(answer))
            .branch(dptree::filter(|_: Message| true).endpoint(handle_invalid_command)),
    )
    .dependencies(dptree::deps![state])
    .build()
    .dispatch()
    .await;
}

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "display this text.")]
    Help,
    #[command(description = "[exercise] [weight] [reps] log a set.")]
    Log(String),
    #[command(description = "[weight] log body weight.")]
    Bodyweight(f64),
    #[command(description = "[exercise] show the strength score.")]
    Score(String),
    #[command(description = "show this week's set volume.")]
    Volume,
    #[command(description = "show current phase progress.")]
    Progress,
}

fn date_to_excel_serial(date: NaiveDate) -> f64 {
    // Excel epoch is 1899-12-30 (accounting for Excel's leap year bug)
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    (date - excel_epoch).num_days() as f64
}

/// Appends a log row to the workbook, or updates the existing row when
/// the same exercise was already logged that day.
fn append_row(
    path: &PathBuf,
    date: NaiveDate,
    weight: f64,
    repetitions: Option<u32>,
    exercise: &str,
) -> Result<&'static str, Box<dyn std::error::Error>> {
    // Open existing file
    let mut book = reader::xlsx::read(path)?;
    let sheet = book.get_sheet_mut(&0).ok_or("Sheet not found")?;
    let date_excel = date_to_excel_serial(date);
    let mut result = "";

    // Find next empty row or existing row with the same date and exercise
    let last_row = sheet.get_highest_row() + 1;
    let mut update_row = last_row;
    for i in 0..last_row {
        let date_cell = sheet.get_cell_mut((1, i)).get_value_number();
        let exercise_cell = sheet.get_cell_mut((4, i)).get_value();
        if date_cell == Some(date_excel) && exercise_cell == exercise {
            update_row = i;
            result = " [updated]";
            break;
        }
    }

    // Write cells
    let date_cell = sheet.get_cell_mut((1, update_row));
    date_cell.set_value_number(date_excel);
    date_cell
        .get_style_mut()
        .get_number_format_mut()
        .set_format_code("yyyy-mm-dd");

    sheet.get_cell_mut((2, update_row)).set_value_number(weight);
    if let Some(reps) = repetitions {
        sheet.get_cell_mut((3, update_row)).set_value_number(reps);
    }
    sheet.get_cell_mut((4, update_row)).set_value(exercise);

    // Save
    writer::xlsx::write(&book, path)?;
    Ok(result)
}

/// Splits "/log bench press 100 5" into its parts.
fn parse_log_args(args: &str) -> Result<(&'static str, f64, u32), String> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err("Usage: /log [exercise] [weight] [reps]".to_string());
    }

    let (name_tokens, numbers) = tokens.split_at(tokens.len() - 2);
    let name = name_tokens.join(" ");

    let exercise =
        catalog::find(&name).ok_or_else(|| format!("Unknown exercise: {}", name))?;
    let weight: f64 = numbers[0]
        .parse()
        .map_err(|_| format!("Invalid weight: {}", numbers[0]))?;
    let reps: u32 = numbers[1]
        .parse()
        .map_err(|_| format!("Invalid reps: {}", numbers[1]))?;

    if weight <= 0.0 {
        return Err(format!("Weight must be positive: {}", weight));
    }
    if reps == 0 {
        return Err("Reps must be at least 1".to_string());
    }

    Ok((exercise.name, weight, reps))
}

async fn answer(bot: Bot, msg: Message, cmd: Command, state: Arc<AppState>) -> ResponseResult<()> {
    let today = Local::now().date_naive();
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?
        }
        Command::Log(args) => {
            let reply = match parse_log_args(&args) {
                Ok((exercise, weight, reps)) => {
                    match append_row(&state.file_path, today, weight, Some(reps), exercise) {
                        Ok(tag) => {
                            format!("Logged {} {}kg x {} for {:?}.{}", exercise, weight, reps, today, tag)
                        }
                        Err(e) => format!("Failed to write workbook: {}", e),
                    }
                }
                Err(e) => e,
            };
            bot.send_message(msg.chat.id, reply).await?
        }
        Command::Bodyweight(bodyweight) => {
            let reply = if bodyweight > 0.0 {
                match append_row(&state.file_path, today, bodyweight, None, "bodyweight") {
                    Ok(tag) => format!("Your body weight for {:?} is {}kg.{}", today, bodyweight, tag),
                    Err(e) => format!("Failed to write workbook: {}", e),
                }
            } else {
                format!("Weight must be positive: {}", bodyweight)
            };
            bot.send_message(msg.chat.id, reply).await?
        }
        Command::Score(name) => {
            let data = state.data.read().await;
            let reply = match data.analysis.stats_for(&name) {
                Some(stats) => match stats.score {
                    Some(score) => format!(
                        "{}: {} ({})\nBest e1RM: {}kg\nScored against benchmark {}",
                        stats.exercise.name,
                        score.score,
                        score.band().label(),
                        round1(stats.best_one_rm),
                        score.scaled_benchmark
                    ),
                    None => format!(
                        "{}: no score yet (log a bodyweight first)\nBest e1RM: {}kg",
                        stats.exercise.name,
                        round1(stats.best_one_rm)
                    ),
                },
                None => format!("No sets logged for: {}", name),
            };
            drop(data);

            bot.send_message(msg.chat.id, reply).await?
        }
        Command::Volume => {
            let data = state.data.read().await;
            let analysis = &data.analysis;
            let lines: Vec<String> = analysis
                .weekly_volume
                .iter()
                .map(|g| {
                    format!(
                        "{}: {}/{} sets ({:.0}%)",
                        g.muscle_group.display_name(),
                        g.count,
                        analysis.weekly_target,
                        ring_fraction(g.count, analysis.weekly_target) * 100.0
                    )
                })
                .collect();
            let reply = format!("Week of {}:\n{}", analysis.week_start, lines.join("\n"));
            drop(data);

            bot.send_message(msg.chat.id, reply).await?
        }
        Command::Progress => {
            let data = state.data.read().await;
            let reply = match &data.analysis.phase {
                Some(summary) => {
                    let time = summary
                        .progress
                        .time
                        .map(|t| format!("{:.0}%", t * 100.0))
                        .unwrap_or_else(|| "open-ended".to_string());
                    let weight = summary
                        .progress
                        .weight
                        .map(|w| format!("{:.0}%", w * 100.0))
                        .unwrap_or_else(|| "no goal".to_string());
                    format!(
                        "Phase since {}:\nTime: {}\nWeight: {}",
                        summary.phase.start_date, time, weight
                    )
                }
                None => "No active phase.".to_string(),
            };
            drop(data);

            bot.send_message(msg.chat.id, reply).await?
        }
    };

    Ok(())
}

async fn handle_invalid_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    let text = msg.text().unwrap_or("");

    // Try to parse and get the actual error
    match Command::parse(text, "") {
        Ok(_) => {} // Shouldn't happen, but ignore
        Err(err) => {
            let error_msg = match err {
                ParseError::TooFewArguments {
                    expected,
                    found,
                    message,
                } => {
                    format!("Missing argument. Expected {expected}, got {found}.\nUsage: {message}")
                }
                ParseError::TooManyArguments {
                    expected,
                    found,
                    message,
                } => {
                    format!(
                        "Too many arguments. Expected {expected}, got {found}.\nUsage: {message}"
                    )
                }
                ParseError::IncorrectFormat(err) => {
                    format!("Invalid format: {err}")
                }
                ParseError::UnknownCommand(cmd) => {
                    format!("Unknown command: {cmd}\n\n{}", Command::descriptions())
                }
                ParseError::WrongBotName(_) => return Ok(()),
                ParseError::Custom(err) => format!("Error: {err}"),
            };

            bot.send_message(msg.chat.id, error_msg).await?;
        }
    }

    Ok(())
}
