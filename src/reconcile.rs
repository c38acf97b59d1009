//! Column-name reconciliation between the two populations.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
    error::{PipelineError, Result, Stage},
    frame::Frame,
};

/// Column names present in only one of two frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDifference {
    pub only_first: Vec<String>,
    pub only_second: Vec<String>,
}

impl SchemaDifference {
    pub fn is_empty(&self) -> bool {
        self.only_first.is_empty() && self.only_second.is_empty()
    }

    pub fn into_error(self, stage: Stage) -> PipelineError {
        PipelineError::ReconciliationIncomplete {
            stage,
            only_first: self.only_first,
            only_second: self.only_second,
        }
    }
}

/// Applies `renames` (old name → new name). Names absent from the frame are
/// skipped; a rename onto an existing column is rejected rather than
/// producing two columns with one name.
pub fn rename_columns(mut frame: Frame, renames: &BTreeMap<String, String>) -> Result<Frame> {
    for (from, to) in renames {
        if from == to {
            continue;
        }
        let Some(idx) = frame.column_index(from) else {
            debug!("Rename source '{}' not present; skipping", from);
            continue;
        };
        if frame.column_index(to).is_some() {
            return Err(PipelineError::RenameCollision {
                from: from.clone(),
                to: to.clone(),
            });
        }
        frame.rename_column(idx, to.clone());
        debug!("Renamed column '{}' -> '{}'", from, to);
    }
    Ok(frame)
}

/// Symmetric difference of the two frames' column-name sets, sorted.
pub fn schema_difference(first: &Frame, second: &Frame) -> SchemaDifference {
    let left = first.column_set();
    let right = second.column_set();
    SchemaDifference {
        only_first: left.difference(&right).cloned().collect(),
        only_second: right.difference(&left).cloned().collect(),
    }
}

/// Renames both populations and checks that their column sets now agree.
pub fn reconcile(
    descriptions: Frame,
    locale_prices: Frame,
    description_renames: &BTreeMap<String, String>,
    locale_price_renames: &BTreeMap<String, String>,
) -> Result<(Frame, Frame)> {
    let descriptions = rename_columns(descriptions, description_renames)?;
    let locale_prices = rename_columns(locale_prices, locale_price_renames)?;
    let difference = schema_difference(&descriptions, &locale_prices);
    if !difference.is_empty() {
        return Err(difference.into_error(Stage::Reconcile));
    }
    info!(
        "Reconciled schemas: {} shared column(s)",
        descriptions.columns().len()
    );
    Ok((descriptions, locale_prices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn frame(columns: &[&str]) -> Frame {
        let row = columns
            .iter()
            .map(|c| Some(Value::Text(c.to_string())))
            .collect();
        Frame::from_rows(columns.iter().map(|c| c.to_string()).collect(), vec![row])
    }

    fn renames(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn fixed_rename_map_aligns_populations() {
        let shared = ["prod_id", "country", "piece_count", "prod_short_desc"];
        let mut description_columns = vec!["set", "theme", "val_star_rating"];
        description_columns.extend(shared);
        let mut locale_columns = vec!["set_name", "theme_name", "value_rating"];
        locale_columns.extend(shared.iter().filter(|c| **c != "prod_short_desc"));
        locale_columns.push("prod_desc");

        let descriptions = frame(&description_columns);
        let locale = frame(&locale_columns);
        assert!(!schema_difference(&descriptions, &locale).is_empty());

        let (descriptions, locale) = reconcile(
            descriptions,
            locale,
            &renames(&[
                ("set", "set_name"),
                ("theme", "theme_name"),
                ("val_star_rating", "value_rating"),
            ]),
            &renames(&[("prod_desc", "prod_short_desc")]),
        )
        .unwrap();
        assert!(schema_difference(&descriptions, &locale).is_empty());
        // Values travel with their renamed column.
        let idx = descriptions.column_index("set_name").unwrap();
        assert_eq!(descriptions.get(0, idx), Some(&Value::Text("set".to_string())));
    }

    #[test]
    fn incomplete_reconciliation_is_an_error() {
        let err = reconcile(
            frame(&["set", "country"]),
            frame(&["set_name", "country"]),
            &renames(&[]),
            &renames(&[]),
        )
        .unwrap_err();
        match err {
            PipelineError::ReconciliationIncomplete {
                only_first,
                only_second,
                ..
            } => {
                assert_eq!(only_first, vec!["set".to_string()]);
                assert_eq!(only_second, vec!["set_name".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rename_preserves_values_and_rejects_collisions() {
        let renamed =
            rename_columns(frame(&["set", "x"]), &renames(&[("set", "set_name")])).unwrap();
        assert_eq!(renamed.columns(), ["set_name", "x"]);
        assert_eq!(renamed.get(0, 0), Some(&Value::Text("set".to_string())));

        let err = rename_columns(frame(&["set", "set_name"]), &renames(&[("set", "set_name")]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::RenameCollision { .. }));
    }
}
