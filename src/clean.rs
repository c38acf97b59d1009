//! Cleaning stage: numeric typing, exact-duplicate removal and age-range
//! normalisation.

use std::collections::HashSet;

use log::{info, warn};
use serde::Serialize;

use crate::{
    error::{PipelineError, Result, Stage},
    fields,
    frame::Frame,
    value::{Cell, Value},
};

/// Marker for a range with no upper bound, e.g. `12+`.
pub const OPEN_RANGE_MARKER: &str = "+";
pub const HALF_YEAR_GLYPH: &str = "½";
pub const RANGE_SEPARATOR: char = '-';
/// Upper bound written for open-ended ranges.
pub const NO_UPPER_BOUND: f64 = 99.0;

/// Coerces the listed columns to floats and integers. Columns missing from
/// the frame are ignored; a value that cannot be represented is an error.
pub fn coerce_numeric_columns(
    mut frame: Frame,
    float_columns: &[String],
    integer_columns: &[String],
) -> Result<Frame> {
    for (columns, expected) in [(float_columns, "float"), (integer_columns, "integer")] {
        for name in columns {
            let Some(col) = frame.column_index(name) else {
                continue;
            };
            for pos in 0..frame.len() {
                let Some(value) = frame.get(pos, col) else {
                    continue;
                };
                let coerced = if expected == "float" {
                    to_float(value)
                } else {
                    to_integer(value)
                };
                match coerced {
                    Some(v) => frame.set(pos, col, Some(v)),
                    None => {
                        return Err(PipelineError::InvalidValue {
                            column: name.clone(),
                            row_id: frame.row_ids()[pos],
                            value: value.as_display(),
                            expected,
                        });
                    }
                }
            }
        }
    }
    Ok(frame)
}

fn to_float(value: &Value) -> Option<Value> {
    match value {
        Value::Float(f) => Some(Value::Float(*f)),
        Value::Integer(i) => Some(Value::Float(*i as f64)),
        Value::Text(s) => s.trim().parse().ok().map(Value::Float),
        Value::Boolean(_) => None,
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Integer(i) => Some(Value::Integer(*i)),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(Value::Integer(*f as i64)),
        Value::Text(s) => s.trim().parse().ok().map(Value::Integer),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DedupReport {
    pub rows_before: usize,
    pub rows_removed: usize,
    /// Share of `rows_before` that was removed, in percent.
    pub percent_removed: f64,
}

impl DedupReport {
    pub fn new(rows_before: usize, rows_removed: usize) -> Self {
        let percent_removed = if rows_before == 0 {
            0.0
        } else {
            rows_removed as f64 / rows_before as f64 * 100.0
        };
        DedupReport {
            rows_before,
            rows_removed,
            percent_removed,
        }
    }
}

/// Drops every row that repeats an earlier row across all columns, nulls
/// included. The first occurrence keeps its position and identity.
pub fn deduplicate(mut frame: Frame) -> (Frame, DedupReport) {
    let keep = {
        let mut seen: HashSet<&[Cell]> = HashSet::with_capacity(frame.len());
        frame
            .rows()
            .iter()
            .map(|row| seen.insert(row.as_slice()))
            .collect::<Vec<_>>()
    };
    let report = DedupReport::new(frame.len(), keep.iter().filter(|k| !**k).count());
    frame.retain_rows(&keep);
    info!(
        "Removed {} duplicate row(s) of {} ({:.2}%)",
        report.rows_removed,
        report.rows_before,
        report.percent_removed
    );
    (frame, report)
}

/// Parses an age range such as `7-14`, `5+` or `1½-3` into `(min, max)`.
/// Returns `None` when the normalised text is not two numbers joined by
/// the range separator.
pub fn parse_age_range(raw: &str) -> Option<(f64, f64)> {
    let normalized = raw
        .replace(OPEN_RANGE_MARKER, &format!("{RANGE_SEPARATOR}{NO_UPPER_BOUND}"))
        .replace(HALF_YEAR_GLYPH, ".5");
    let parts = normalized.split(RANGE_SEPARATOR).collect::<Vec<_>>();
    let [low, high] = parts.as_slice() else {
        return None;
    };
    let low = low.trim().parse::<f64>().ok()?;
    let high = high.trim().parse::<f64>().ok()?;
    Some((low, high))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgeReport {
    pub open_ended: usize,
    /// Identities of rows whose upper bound is below the lower bound.
    pub inverted: Vec<usize>,
}

/// Replaces the `ages` text column with numeric `age_min` and `age_max`
/// columns appended at the right-hand edge.
pub fn normalize_ages(mut frame: Frame) -> Result<(Frame, AgeReport)> {
    let col = frame.require_column(fields::AGES, Stage::Clean)?;
    let mut report = AgeReport::default();
    let mut minimums = Vec::with_capacity(frame.len());
    let mut maximums = Vec::with_capacity(frame.len());

    for (pos, cell) in frame.column_cells(col).enumerate() {
        let row_id = frame.row_ids()[pos];
        let raw = match cell {
            Some(Value::Text(s)) => s.as_str(),
            other => {
                return Err(PipelineError::MalformedRange {
                    row_id,
                    value: other.as_ref().map(Value::as_display).unwrap_or_default(),
                });
            }
        };
        let (low, high) = parse_age_range(raw).ok_or_else(|| PipelineError::MalformedRange {
            row_id,
            value: raw.to_string(),
        })?;
        if raw.contains(OPEN_RANGE_MARKER) {
            report.open_ended += 1;
        }
        if high < low {
            report.inverted.push(row_id);
        }
        minimums.push(Some(Value::Float(low)));
        maximums.push(Some(Value::Float(high)));
    }

    frame.drop_column(col);
    frame.push_column(fields::AGE_MIN.to_string(), minimums);
    frame.push_column(fields::AGE_MAX.to_string(), maximums);

    if !report.inverted.is_empty() {
        warn!(
            "{} row(s) have an upper age bound below the lower bound (row ids {:?})",
            report.inverted.len(),
            report.inverted
        );
    }
    info!(
        "Normalized {} age range(s) ({} open-ended)",
        frame.len(),
        report.open_ended
    );
    Ok((frame, report))
}
