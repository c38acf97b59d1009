//! Missing-value imputation.
//!
//! Each target column has its own strategy:
//!
//! | column | strategy |
//! |---|---|
//! | `num_reviews` | constant `0.0` (a missing count means no reviews) |
//! | `review_difficulty` | Gaussian Naive Bayes prediction, see [`difficulty`] |
//! | `theme_name` | versioned manual overrides, see [`theme`] |
//! | `prod_short_desc` | empty string |
//! | ratings | borrow from overall, then hot-deck, see [`ratings`] |

pub mod difficulty;
pub mod ratings;
pub mod theme;

use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use crate::{
    classifier::Classifier,
    error::{Result, Stage},
    fields,
    frame::Frame,
    value::Value,
};

use self::{
    ratings::RatingsOutcome,
    theme::{ThemeOutcome, ThemeOverrides},
};

/// Replaces every null in `column` with `value`; returns the number of cells filled.
pub fn fill_nulls(frame: &mut Frame, column: &str, value: Value) -> Result<usize> {
    let col = frame.require_column(column, Stage::Impute)?;
    let missing = frame.null_positions(col);
    for pos in &missing {
        frame.set(*pos, col, Some(value.clone()));
    }
    info!("Filled {} null(s) in '{}' with {:?}", missing.len(), column, value.as_display());
    Ok(missing.len())
}

/// A target column that still holds nulls after imputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedNulls {
    pub column: String,
    pub row_ids: Vec<usize>,
}

/// Lists the `columns` that still contain nulls, with the offending rows.
pub fn unresolved_nulls(frame: &Frame, columns: &[&str]) -> Vec<UnresolvedNulls> {
    columns
        .iter()
        .filter_map(|name| {
            let col = frame.column_index(name)?;
            let row_ids = frame
                .null_positions(col)
                .into_iter()
                .map(|pos| frame.row_ids()[pos])
                .collect::<Vec<_>>();
            (!row_ids.is_empty()).then(|| UnresolvedNulls {
                column: name.to_string(),
                row_ids,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImputationReport {
    pub num_reviews_filled: usize,
    /// Rows whose difficulty is a model prediction.
    pub synthetic_difficulty: Vec<usize>,
    pub theme: ThemeOutcome,
    pub prod_short_desc_filled: usize,
    pub ratings: RatingsOutcome,
    pub unresolved: Vec<UnresolvedNulls>,
}

/// Runs all five strategies and checks that the target columns are free of
/// nulls. Leftover nulls are reported, not raised.
pub fn impute_all<C, R>(
    mut frame: Frame,
    classifier: &mut C,
    overrides: &ThemeOverrides,
    rng: &mut R,
) -> Result<(Frame, ImputationReport)>
where
    C: Classifier + ?Sized,
    R: Rng,
{
    let mut report = ImputationReport {
        num_reviews_filled: fill_nulls(&mut frame, fields::NUM_REVIEWS, Value::Float(0.0))?,
        ..ImputationReport::default()
    };
    report.synthetic_difficulty = difficulty::impute_difficulty(&mut frame, classifier)?;
    report.theme = theme::apply_theme_overrides(&mut frame, overrides)?;
    report.prod_short_desc_filled = fill_nulls(
        &mut frame,
        fields::PROD_SHORT_DESC,
        Value::Text(String::new()),
    )?;
    report.ratings = ratings::impute_ratings(&mut frame, rng)?;

    report.unresolved = unresolved_nulls(&frame, &fields::IMPUTED_COLUMNS);
    for entry in &report.unresolved {
        warn!(
            "Column '{}' still has {} null(s) after imputation (row ids {:?})",
            entry.column,
            entry.row_ids.len(),
            entry.row_ids
        );
    }
    Ok((frame, report))
}
