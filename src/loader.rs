//! Record-file loaders for the two source populations.
//!
//! Each population is a directory of small JSON documents holding one flat
//! record apiece. Files are visited in file-name order so that row identity
//! is stable between runs, and all records are collected before the frame
//! is built in a single pass.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    error::{PipelineError, Result, Stage},
    frame::{Frame, Record},
    value::{Value, cell_from_json},
};

pub const RECORD_EXTENSION: &str = "json";

/// Loads the set-description population: every field comes from the file body.
pub fn load_descriptions(dir: &Path) -> Result<Frame> {
    let files = list_record_files(dir)?;
    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        records.push(read_record(path)?);
    }
    let frame = Frame::from_records(records);
    info!(
        "Loaded {} set-description record(s) with {} column(s) from {:?}",
        frame.len(),
        frame.columns().len(),
        dir
    );
    Ok(frame)
}

/// Loads the locale-price population. The product id and country code are
/// taken from the file name (`<product_id><delimiter><country_code>.json`)
/// and override any same-named field in the body.
pub fn load_locale_prices(
    dir: &Path,
    delimiter: char,
    product_id_field: &str,
    country_field: &str,
) -> Result<Frame> {
    let files = list_record_files(dir)?;
    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        let (product_id, country) = split_file_name(path, delimiter)?;
        let mut record = read_record(path)?;
        record.retain(|(name, _)| name != product_id_field && name != country_field);
        record.push((product_id_field.to_string(), Some(product_id_cell(&product_id))));
        record.push((country_field.to_string(), Some(Value::Text(country))));
        records.push(record);
    }
    let frame = Frame::from_records(records);
    info!(
        "Loaded {} locale-price record(s) with {} column(s) from {:?}",
        frame.len(),
        frame.columns().len(),
        dir
    );
    Ok(frame)
}

/// Splits a file stem into exactly two non-empty parts.
pub fn split_file_name(path: &Path, delimiter: char) -> Result<(String, String)> {
    let malformed = || PipelineError::MalformedFilename {
        path: path.to_path_buf(),
        delimiter,
    };
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(malformed)?;
    let parts = stem.split(delimiter).collect::<Vec<_>>();
    match parts.as_slice() {
        [product, country] if !product.is_empty() && !country.is_empty() => {
            Ok((product.to_string(), country.to_string()))
        }
        _ => Err(malformed()),
    }
}

// Numeric product ids line up with the integer ids of the other population.
fn product_id_cell(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::Integer)
        .unwrap_or_else(|_| Value::Text(raw.to_string()))
}

pub fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_error = |source| PipelineError::Io {
        stage: Stage::Load,
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_record = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(RECORD_EXTENSION));
        if is_record {
            files.push(path);
        } else {
            debug!("Skipping non-record entry {:?}", path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_record(path: &Path) -> Result<Record> {
    let raw = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        stage: Stage::Load,
        path: path.to_path_buf(),
        source,
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let serde_json::Value::Object(map) = document else {
        return Err(PipelineError::InvalidRecord {
            path: path.to_path_buf(),
            reason: "top-level value is not an object".to_string(),
        });
    };
    map.iter()
        .map(|(name, value)| {
            cell_from_json(value)
                .map(|cell| (name.clone(), cell))
                .map_err(|reason| PipelineError::InvalidRecord {
                    path: path.to_path_buf(),
                    reason: format!("field '{name}': {reason}"),
                })
        })
        .collect()
}
