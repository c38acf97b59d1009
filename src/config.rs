//! Pipeline configuration.
//!
//! Everything here has a default that matches the two known source shapes,
//! so a config file only needs to list what differs. Example:
//!
//! ```yaml
//! description_renames:
//!   set: set_name
//!   theme: theme_name
//! filename_delimiter: "_"
//! overrides: theme_overrides.yaml
//! seed: 42
//! ```

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{fields, value::CellKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Renames applied to the set-description population.
    pub description_renames: BTreeMap<String, String>,
    /// Renames applied to the locale-price population.
    pub locale_price_renames: BTreeMap<String, String>,
    /// Separator between product id and country code in locale-price file names.
    pub filename_delimiter: char,
    pub product_id_field: String,
    pub country_field: String,
    pub float_columns: Vec<String>,
    pub integer_columns: Vec<String>,
    /// Versioned theme-name override table.
    pub overrides: Option<PathBuf>,
    /// Seed for the hot-deck sampler. A fresh seed is drawn and logged when absent.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let description_renames = [
            ("set", fields::SET_NAME),
            ("theme", fields::THEME_NAME),
            ("val_star_rating", fields::VALUE_RATING),
            ("star_rating", fields::OVERALL_RATING),
            ("play_star_rating", fields::PLAY_RATING),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
        let locale_price_renames = [("prod_desc", fields::PROD_SHORT_DESC)]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        PipelineConfig {
            description_renames,
            locale_price_renames,
            filename_delimiter: '_',
            product_id_field: fields::PRODUCT_ID.to_string(),
            country_field: fields::COUNTRY.to_string(),
            float_columns: [
                fields::LIST_PRICE,
                fields::NUM_REVIEWS,
                fields::PLAY_RATING,
                fields::VALUE_RATING,
                fields::OVERALL_RATING,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            integer_columns: vec![fields::PIECE_COUNT.to_string()],
            overrides: None,
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let mut config: PipelineConfig =
            serde_yaml::from_reader(reader).context("Parsing pipeline config YAML")?;
        // Relative override paths are resolved against the config file.
        if let Some(overrides) = config.overrides.as_mut()
            && overrides.is_relative()
            && let Some(parent) = path.parent()
        {
            *overrides = parent.join(&*overrides);
        }
        config.validate()?;
        Ok(config)
    }

    /// Kinds of the columns this configuration types, plus the numeric age
    /// bounds. Suitable for reading an exported table back without the
    /// in-memory frame; every other column is read as text.
    pub fn column_kinds(&self) -> BTreeMap<String, CellKind> {
        let floats = self
            .float_columns
            .iter()
            .map(String::as_str)
            .chain([fields::AGE_MIN, fields::AGE_MAX])
            .map(|c| (c.to_string(), CellKind::Float));
        let integers = self
            .integer_columns
            .iter()
            .map(|c| (c.clone(), CellKind::Integer));
        floats.chain(integers).collect()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.product_id_field != self.country_field,
            "product_id_field and country_field must differ"
        );
        for (from, to) in self
            .description_renames
            .iter()
            .chain(self.locale_price_renames.iter())
        {
            ensure!(
                !from.trim().is_empty() && !to.trim().is_empty(),
                "Rename entries must name both columns"
            );
        }
        ensure!(
            !self
                .float_columns
                .iter()
                .any(|c| self.integer_columns.contains(c)),
            "A column cannot be both float and integer typed"
        );
        Ok(())
    }
}
