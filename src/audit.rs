//! Null-count audit of a frame.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::AuditArgs, config::PipelineConfig, frame::Frame, pipeline, table};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAudit {
    pub column: String,
    pub nulls: usize,
    pub percent: f64,
}

pub fn audit_nulls(frame: &Frame) -> Vec<ColumnAudit> {
    frame
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let nulls = frame.null_count(idx);
            let percent = if frame.is_empty() {
                0.0
            } else {
                nulls as f64 / frame.len() as f64 * 100.0
            };
            ColumnAudit {
                column: name.clone(),
                nulls,
                percent,
            }
        })
        .collect()
}

fn audit_rows(frame: &Frame) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = vec![
        "column".to_string(),
        "nulls".to_string(),
        "percent".to_string(),
    ];
    let rows = audit_nulls(frame)
        .into_iter()
        .map(|entry| {
            vec![
                entry.column,
                entry.nulls.to_string(),
                format!("{:.2}%", entry.percent),
            ]
        })
        .collect();
    (headers, rows)
}

pub fn render(frame: &Frame) -> String {
    let (headers, rows) = audit_rows(frame);
    table::render_table(&headers, &rows)
}

/// Loads, merges and cleans the inputs, then prints per-column null counts
/// of the table that imputation would receive.
pub fn execute(args: &AuditArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading pipeline config from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    let (frame, report) = pipeline::prepare(&config, &args.descriptions, &args.locale_prices)?;
    let (headers, rows) = audit_rows(&frame);
    table::print_table(&headers, &rows);
    info!(
        "Audited {} row(s) ({} loaded, {} duplicate(s) removed)",
        frame.len(),
        report.merged_rows,
        report.dedup.rows_removed
    );
    Ok(())
}
