//! Manual theme-name overrides.
//!
//! The override table is a small, versioned YAML document researched out of
//! band:
//!
//! ```yaml
//! version: "2024-03-01"
//! overrides:
//!   - row: 1318
//!     theme_name: Star Wars
//!     note: listed under "Ultimate Collector Series" on the box
//! ```
//!
//! Rows are addressed by the identity assigned at merge time.

use std::{fs, path::Path};

use anyhow::{Context, Result as AnyResult, bail};
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    error::{Result, Stage},
    fields,
    frame::Frame,
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeOverride {
    pub row: usize,
    pub theme_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeOverrides {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub overrides: Vec<ThemeOverride>,
    /// SHA-256 of the file the table was read from.
    #[serde(skip)]
    pub digest: Option<String>,
}

impl ThemeOverrides {
    pub fn new(version: impl Into<String>, overrides: Vec<ThemeOverride>) -> Self {
        ThemeOverrides {
            version: version.into(),
            overrides,
            digest: None,
        }
    }

    pub fn load(path: &Path) -> AnyResult<Self> {
        let raw =
            fs::read(path).with_context(|| format!("Reading theme overrides from {path:?}"))?;
        let mut table: ThemeOverrides =
            serde_yaml::from_slice(&raw).context("Parsing theme override YAML")?;
        if let Some(row) = table.overrides.iter().map(|o| o.row).duplicates().next() {
            bail!("Theme override table {path:?} lists row {row} more than once");
        }
        table.digest = Some(format!("{:x}", Sha256::digest(&raw)));
        info!(
            "Loaded {} theme override(s), version '{}' (sha256 {})",
            table.overrides.len(),
            table.version,
            table.digest.as_deref().unwrap_or_default()
        );
        Ok(table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeOutcome {
    /// Rows that received their override.
    pub applied: Vec<usize>,
    /// Overrides whose row no longer exists or already has a theme.
    pub skipped: Vec<usize>,
}

/// Writes each override into its row when that row's theme is null. No
/// other row is touched.
pub fn apply_theme_overrides(frame: &mut Frame, table: &ThemeOverrides) -> Result<ThemeOutcome> {
    let col = frame.require_column(fields::THEME_NAME, Stage::Impute)?;
    let mut outcome = ThemeOutcome::default();
    for entry in &table.overrides {
        let Some(pos) = frame.position_of(entry.row) else {
            warn!(
                "Theme override for row {} skipped: row not present",
                entry.row
            );
            outcome.skipped.push(entry.row);
            continue;
        };
        if let Some(existing) = frame.get(pos, col) {
            warn!(
                "Theme override for row {} skipped: theme already set to '{}'",
                entry.row, existing
            );
            outcome.skipped.push(entry.row);
            continue;
        }
        frame.set(pos, col, Some(Value::Text(entry.theme_name.clone())));
        outcome.applied.push(entry.row);
    }
    info!(
        "Applied {} theme override(s), skipped {}",
        outcome.applied.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}
