//! Excel workbook parsing for the workout log.
//!
//! The first sheet holds the log itself: one row per set, with a
//! `bodyweight` exercise row recording a bodyweight measurement. An
//! optional `phases` sheet holds bulk/cut phases. Malformed rows are
//! skipped with a warning; structural problems are errors.

use calamine::{Data, DataType, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;
use log::warn;
use std::path::Path;

use crate::catalog;
use crate::domain::{LoggedSet, Phase, WeightSample, WorkoutLog};
use crate::error::ParseError;

/// Expected log columns (case-insensitive).
const COL_DATE: &str = "date";
const COL_WEIGHT: &str = "weight";
const COL_REPS: &str = "repetitions";
const COL_EXERCISE: &str = "exercise";

/// Expected phase columns (case-insensitive).
const COL_START: &str = "start";
const COL_END: &str = "end";
const COL_STARTING_WEIGHT: &str = "starting weight";
const COL_GOAL_WEIGHT: &str = "goal weight";

/// Name of the optional phases sheet.
const PHASES_SHEET: &str = "phases";

/// Exercise-column keyword marking a bodyweight measurement row.
const BODYWEIGHT_KEYWORD: &str = "bodyweight";

fn find_column(header: &[Data], name: &str) -> Result<usize, ParseError> {
    header
        .iter()
        .position(|cell| {
            cell.get_string()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
}

/// Column indices of the log sheet.
struct LogColumns {
    date: usize,
    weight: usize,
    reps: usize,
    exercise: usize,
}

impl LogColumns {
    fn from_header(header: &[Data]) -> Result<Self, ParseError> {
        Ok(Self {
            date: find_column(header, COL_DATE)?,
            weight: find_column(header, COL_WEIGHT)?,
            reps: find_column(header, COL_REPS)?,
            exercise: find_column(header, COL_EXERCISE)?,
        })
    }
}

/// Column indices of the phases sheet.
struct PhaseColumns {
    start: usize,
    end: usize,
    starting_weight: usize,
    goal_weight: usize,
}

impl PhaseColumns {
    fn from_header(header: &[Data]) -> Result<Self, ParseError> {
        Ok(Self {
            start: find_column(header, COL_START)?,
            end: find_column(header, COL_END)?,
            starting_weight: find_column(header, COL_STARTING_WEIGHT)?,
            goal_weight: find_column(header, COL_GOAL_WEIGHT)?,
        })
    }
}

/// Loads the workout log from an Excel file.
///
/// # Arguments
/// * `path` - Path to the Excel file (.xlsx)
///
/// # Returns
/// A `WorkoutLog` with sets grouped per exercise and sorted by date.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or a sheet has an
/// invalid structure. Individual bad rows are logged and skipped.
pub fn load_workout_log<P: AsRef<Path>>(path: P) -> Result<WorkoutLog, ParseError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ParseError::FileNotFound(path.display().to_string()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ParseError::CannotRead(format!("{}: {}", path.display(), e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let log_sheet = sheet_names
        .iter()
        .find(|name| !name.eq_ignore_ascii_case(PHASES_SHEET))
        .ok_or_else(|| ParseError::InvalidFormat("workbook has no log sheet".to_string()))?
        .clone();

    let range = workbook
        .worksheet_range(&log_sheet)
        .map_err(|e| ParseError::CannotRead(format!("cannot read sheet '{}': {}", log_sheet, e)))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("empty log sheet".to_string()))?;
    let columns = LogColumns::from_header(header)?;

    let mut set_rows: Vec<(&'static str, LoggedSet)> = Vec::new();
    let mut weights: Vec<WeightSample> = Vec::new();

    for (row_idx, row) in rows.enumerate() {
        let row_num = row_idx + 2; // +1 for 0-index, +1 for header row

        // Skip empty rows silently (common at end of spreadsheets)
        if row[columns.date] == Data::Empty {
            continue;
        }

        let date = match parse_date(&row[columns.date], row_num) {
            Ok(d) => d,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let exercise_name = match exercise_cell_string(&row[columns.exercise], row_num) {
            Ok(s) => s,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let weight_kg = match parse_weight(&row[columns.weight], row_num) {
            Ok(w) => w,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        // Bodyweight rows become weight samples, everything else is a set.
        if exercise_name.trim().eq_ignore_ascii_case(BODYWEIGHT_KEYWORD) {
            weights.push(WeightSample { date, weight_kg });
            continue;
        }

        let Some(exercise) = catalog::find(&exercise_name) else {
            warn!(
                "{}",
                ParseError::UnknownExercise {
                    row: row_num,
                    value: exercise_name,
                }
            );
            continue;
        };

        let reps = match parse_reps(&row[columns.reps], row_num) {
            Ok(r) => r,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        set_rows.push((
            exercise.name,
            LoggedSet {
                date,
                weight_kg,
                reps,
            },
        ));
    }

    let phases = match sheet_names
        .iter()
        .find(|name| name.eq_ignore_ascii_case(PHASES_SHEET))
    {
        Some(name) => load_phases(&mut workbook, name)?,
        None => Vec::new(),
    };

    Ok(WorkoutLog::from_parts(set_rows, weights, phases))
}

/// Parses the phases sheet.
fn load_phases<R>(
    workbook: &mut Xlsx<R>,
    sheet_name: &str,
) -> Result<Vec<Phase>, ParseError>
where
    R: std::io::Read + std::io::Seek,
{
    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        ParseError::CannotRead(format!("cannot read sheet '{}': {}", sheet_name, e))
    })?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("empty phases sheet".to_string()))?;
    let columns = PhaseColumns::from_header(header)?;

    let mut phases = Vec::new();

    for (row_idx, row) in rows.enumerate() {
        let row_num = row_idx + 2;

        if row[columns.start] == Data::Empty {
            continue;
        }

        match parse_phase_row(row, &columns, row_num) {
            Ok(phase) => phases.push(phase),
            Err(e) => warn!("{}", e),
        }
    }

    Ok(phases)
}

/// Parses one phase row.
fn parse_phase_row(row: &[Data], columns: &PhaseColumns, row_num: usize) -> Result<Phase, ParseError> {
    let start_date = parse_date(&row[columns.start], row_num)?;

    let end_date = match &row[columns.end] {
        Data::Empty => None,
        cell => Some(parse_date(cell, row_num)?),
    };

    if let Some(end) = end_date
        && end <= start_date
    {
        return Err(ParseError::InvalidPhaseRange {
            row: row_num,
            value: format!("{} -> {}", start_date, end),
        });
    }

    let starting_weight_kg = parse_weight(&row[columns.starting_weight], row_num)?;

    let weight_goal_kg = match &row[columns.goal_weight] {
        Data::Empty => None,
        cell => Some(parse_weight(cell, row_num)?),
    };

    Ok(Phase {
        start_date,
        end_date,
        starting_weight_kg,
        weight_goal_kg,
    })
}

/// Parses a date from a cell.
fn parse_date(cell: &Data, row: usize) -> Result<NaiveDate, ParseError> {
    match cell {
        Data::DateTime(dt) => {
            // calamine DateTime to NaiveDate via chrono
            dt.as_datetime()
                .map(|ndt| ndt.date())
                .ok_or_else(|| ParseError::InvalidDate {
                    row,
                    value: format!("{:?}", dt),
                })
        }
        Data::DateTimeIso(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate {
                row,
                value: s.clone(),
            })
        }
        Data::String(s) => {
            // Try common date formats
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
                .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
                .map_err(|_| ParseError::InvalidDate {
                    row,
                    value: s.clone(),
                })
        }
        Data::Empty => Err(ParseError::InvalidDate {
            row,
            value: "(empty)".to_string(),
        }),
        other => Err(ParseError::InvalidDate {
            row,
            value: format!("{:?}", other),
        }),
    }
}

/// Parses a positive weight value from a cell.
fn parse_weight(cell: &Data, row: usize) -> Result<f64, ParseError> {
    match cell {
        Data::Float(f) => {
            if *f > 0.0 {
                Ok(*f)
            } else {
                Err(ParseError::InvalidWeight {
                    row,
                    value: f.to_string(),
                })
            }
        }
        Data::Int(i) => {
            if *i > 0 {
                Ok(*i as f64)
            } else {
                Err(ParseError::InvalidWeight {
                    row,
                    value: i.to_string(),
                })
            }
        }
        Data::String(s) => {
            let weight: f64 = s.parse().map_err(|_| ParseError::InvalidWeight {
                row,
                value: s.clone(),
            })?;
            if weight > 0.0 {
                Ok(weight)
            } else {
                Err(ParseError::InvalidWeight {
                    row,
                    value: s.clone(),
                })
            }
        }
        Data::Empty => Err(ParseError::InvalidWeight {
            row,
            value: "(empty)".to_string(),
        }),
        other => Err(ParseError::InvalidWeight {
            row,
            value: format!("{:?}", other),
        }),
    }
}

/// Parses repetitions from a cell.
fn parse_reps(cell: &Data, row: usize) -> Result<u32, ParseError> {
    match cell {
        Data::Float(f) => {
            let reps = *f as u32;
            if reps > 0 {
                Ok(reps)
            } else {
                Err(ParseError::InvalidReps {
                    row,
                    value: f.to_string(),
                })
            }
        }
        Data::Int(i) => {
            if *i > 0 {
                Ok(*i as u32)
            } else {
                Err(ParseError::InvalidReps {
                    row,
                    value: i.to_string(),
                })
            }
        }
        Data::String(s) => {
            let reps: u32 = s.parse().map_err(|_| ParseError::InvalidReps {
                row,
                value: s.clone(),
            })?;
            if reps > 0 {
                Ok(reps)
            } else {
                Err(ParseError::InvalidReps {
                    row,
                    value: s.clone(),
                })
            }
        }
        Data::Empty => {
            // Empty reps defaults to 1 (an actual 1RM single)
            Ok(1)
        }
        other => Err(ParseError::InvalidReps {
            row,
            value: format!("{:?}", other),
        }),
    }
}

/// Reads the exercise cell as a string.
fn exercise_cell_string(cell: &Data, row: usize) -> Result<String, ParseError> {
    match cell {
        Data::String(s) => Ok(s.clone()),
        Data::Empty => Err(ParseError::UnknownExercise {
            row,
            value: "(empty)".to_string(),
        }),
        other => Err(ParseError::UnknownExercise {
            row,
            value: format!("{:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_columns_from_header() {
        let header = vec![
            Data::String("Date".to_string()),
            Data::String("Weight".to_string()),
            Data::String("Repetitions".to_string()),
            Data::String("Exercise".to_string()),
        ];

        let columns = LogColumns::from_header(&header).unwrap();
        assert_eq!(columns.date, 0);
        assert_eq!(columns.weight, 1);
        assert_eq!(columns.reps, 2);
        assert_eq!(columns.exercise, 3);
    }

    #[test]
    fn test_log_columns_any_order() {
        let header = vec![
            Data::String("exercise".to_string()),
            Data::String("DATE".to_string()),
            Data::String("weight".to_string()),
            Data::String("repetitions".to_string()),
        ];

        let columns = LogColumns::from_header(&header).unwrap();
        assert_eq!(columns.exercise, 0);
        assert_eq!(columns.date, 1);
    }

    #[test]
    fn test_log_columns_missing() {
        let header = vec![
            Data::String("Date".to_string()),
            Data::String("Weight".to_string()),
        ];

        assert!(LogColumns::from_header(&header).is_err());
    }

    #[test]
    fn test_parse_weight_variants() {
        assert_eq!(parse_weight(&Data::Float(100.5), 1).unwrap(), 100.5);
        assert_eq!(parse_weight(&Data::Int(100), 1).unwrap(), 100.0);
        assert_eq!(
            parse_weight(&Data::String("82.5".to_string()), 1).unwrap(),
            82.5
        );
    }

    #[test]
    fn test_parse_weight_invalid() {
        assert!(parse_weight(&Data::Float(-10.0), 1).is_err());
        assert!(parse_weight(&Data::Float(0.0), 1).is_err());
        assert!(parse_weight(&Data::Empty, 1).is_err());
    }

    #[test]
    fn test_parse_reps_empty_defaults_to_single() {
        assert_eq!(parse_reps(&Data::Empty, 1).unwrap(), 1);
    }

    #[test]
    fn test_parse_reps_zero_is_invalid() {
        assert!(parse_reps(&Data::Int(0), 1).is_err());
        assert!(parse_reps(&Data::Float(0.0), 1).is_err());
    }

    #[test]
    fn test_parse_date_string_formats() {
        let date = parse_date(&Data::String("2024-01-15".to_string()), 1).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        assert!(parse_date(&Data::String("not a date".to_string()), 1).is_err());
    }

    #[test]
    fn test_parse_phase_row_full() {
        let columns = PhaseColumns {
            start: 0,
            end: 1,
            starting_weight: 2,
            goal_weight: 3,
        };
        let row = vec![
            Data::String("2024-01-01".to_string()),
            Data::String("2024-03-01".to_string()),
            Data::Float(82.0),
            Data::Float(78.0),
        ];

        let phase = parse_phase_row(&row, &columns, 2).unwrap();
        assert_eq!(phase.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(phase.end_date, Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(phase.starting_weight_kg, 82.0);
        assert_eq!(phase.weight_goal_kg, Some(78.0));
    }

    #[test]
    fn test_parse_phase_row_open_ended() {
        let columns = PhaseColumns {
            start: 0,
            end: 1,
            starting_weight: 2,
            goal_weight: 3,
        };
        let row = vec![
            Data::String("2024-01-01".to_string()),
            Data::Empty,
            Data::Float(82.0),
            Data::Empty,
        ];

        let phase = parse_phase_row(&row, &columns, 2).unwrap();
        assert!(phase.end_date.is_none());
        assert!(phase.weight_goal_kg.is_none());
    }

    #[test]
    fn test_parse_phase_row_rejects_inverted_range() {
        let columns = PhaseColumns {
            start: 0,
            end: 1,
            starting_weight: 2,
            goal_weight: 3,
        };
        let row = vec![
            Data::String("2024-03-01".to_string()),
            Data::String("2024-01-01".to_string()),
            Data::Float(82.0),
            Data::Empty,
        ];

        assert!(matches!(
            parse_phase_row(&row, &columns, 2),
            Err(ParseError::InvalidPhaseRange { .. })
        ));
    }

    #[test]
    fn test_exercise_cell_string() {
        assert_eq!(
            exercise_cell_string(&Data::String("back squat".to_string()), 1).unwrap(),
            "back squat"
        );
        assert!(exercise_cell_string(&Data::Empty, 1).is_err());
    }
}
