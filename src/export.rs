//! Flat-file output of the cleaned table and the matching reader.
//!
//! The file carries a leading `row_id` column followed by the frame's
//! columns. Nulls are written as empty fields. Reading back takes the
//! column kinds from the caller, either [`Frame::column_kinds`] of the
//! table that was written or [`PipelineConfig::column_kinds`]; a column
//! without a kind is text. Numeric columns map empty fields to null, text
//! columns keep them as empty strings.
//!
//! [`PipelineConfig::column_kinds`]: crate::config::PipelineConfig::column_kinds

use std::{collections::BTreeMap, path::Path};

use log::info;

use crate::{
    error::{PipelineError, Result, Stage},
    fields,
    frame::Frame,
    io_utils,
    value::{CellKind, parse_cell},
};

pub fn write_table(frame: &Frame, path: &Path, delimiter: u8) -> Result<()> {
    let csv_error = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    let header = std::iter::once(fields::ROW_ID).chain(frame.columns().iter().map(String::as_str));
    writer.write_record(header).map_err(csv_error)?;
    for (row_id, row) in frame.row_ids().iter().zip(frame.rows()) {
        let record = std::iter::once(row_id.to_string()).chain(
            row.iter()
                .map(|cell| cell.as_ref().map(|v| v.as_display()).unwrap_or_default()),
        );
        writer.write_record(record).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| PipelineError::Io {
        stage: Stage::Export,
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Wrote {} row(s) x {} column(s) to {:?} (delimiter '{}')",
        frame.len(),
        frame.columns().len() + 1,
        path,
        io_utils::printable_delimiter(delimiter)
    );
    Ok(())
}

pub fn read_table(
    path: &Path,
    delimiter: u8,
    kinds: &BTreeMap<String, CellKind>,
) -> Result<Frame> {
    let csv_error = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.first().map(String::as_str) != Some(fields::ROW_ID) {
        return Err(PipelineError::MissingColumn {
            stage: Stage::Export,
            column: fields::ROW_ID.to_string(),
        });
    }

    let column_kinds = headers[1..]
        .iter()
        .map(|name| kinds.get(name).copied().unwrap_or(CellKind::Text))
        .collect::<Vec<_>>();

    let mut row_ids = Vec::new();
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let raw_id = record.get(0).unwrap_or("");
        let row_id = raw_id
            .parse::<usize>()
            .map_err(|_| PipelineError::InvalidValue {
                column: fields::ROW_ID.to_string(),
                row_id: line,
                value: raw_id.to_string(),
                expected: "row identity",
            })?;
        row_ids.push(row_id);
        rows.push(
            column_kinds
                .iter()
                .enumerate()
                .map(|(idx, kind)| parse_cell(record.get(idx + 1).unwrap_or(""), *kind))
                .collect(),
        );
    }
    Ok(Frame::with_row_ids(headers[1..].to_vec(), row_ids, rows))
}
