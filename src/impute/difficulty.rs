//! Supervised imputation of `review_difficulty`.
//!
//! A classifier is trained on the complete-case rows using age, piece count
//! and price, a label is predicted for every row, and only the null cells
//! receive the prediction. The filled values are synthetic.

use log::{info, warn};
use ndarray::Array2;

use crate::{
    classifier::{Classifier, predict_labels},
    error::{PipelineError, Result, Stage},
    fields,
    frame::Frame,
    value::Value,
};

/// Builds a feature matrix over all rows. Every feature cell must be a
/// present number.
pub fn feature_matrix(frame: &Frame, features: &[&str]) -> Result<Array2<f64>> {
    let columns = features
        .iter()
        .map(|name| frame.require_column(name, Stage::Impute))
        .collect::<Result<Vec<_>>>()?;
    let mut matrix = Array2::zeros((frame.len(), columns.len()));
    for pos in 0..frame.len() {
        for (feature, &col) in columns.iter().enumerate() {
            let value = frame
                .get(pos, col)
                .and_then(Value::as_f64)
                .ok_or_else(|| PipelineError::PreconditionViolation {
                    column: features[feature].to_string(),
                    row_id: frame.row_ids()[pos],
                })?;
            matrix[[pos, feature]] = value;
        }
    }
    Ok(matrix)
}

/// Fills null `review_difficulty` cells and returns the identities of the
/// rows that received a predicted label.
pub fn impute_difficulty<C: Classifier + ?Sized>(
    frame: &mut Frame,
    classifier: &mut C,
) -> Result<Vec<usize>> {
    let target = frame.require_column(fields::REVIEW_DIFFICULTY, Stage::Impute)?;
    let missing = frame.null_positions(target);
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let all_features = feature_matrix(frame, &fields::DIFFICULTY_FEATURES)?;
    let labelled = (0..frame.len())
        .filter(|pos| frame.get(*pos, target).is_some())
        .collect::<Vec<_>>();
    if labelled.is_empty() {
        warn!(
            "No labelled {} rows to train on; {} null(s) left in place",
            fields::REVIEW_DIFFICULTY,
            missing.len()
        );
        return Ok(Vec::new());
    }
    let train_x = all_features.select(ndarray::Axis(0), &labelled);
    let train_y = labelled
        .iter()
        .filter_map(|pos| frame.get(*pos, target).map(Value::as_display))
        .collect::<Vec<_>>();

    let predicted = predict_labels(classifier, &train_x, &train_y, &all_features)?;

    let mut filled = Vec::with_capacity(missing.len());
    for pos in missing {
        frame.set(pos, target, Some(Value::Text(predicted[pos].clone())));
        filled.push(frame.row_ids()[pos]);
    }
    info!(
        "Predicted {} from {} labelled row(s); filled {} null(s)",
        fields::REVIEW_DIFFICULTY,
        labelled.len(),
        filled.len()
    );
    warn!(
        "{} value(s) in '{}' are model predictions, not observed data",
        filled.len(),
        fields::REVIEW_DIFFICULTY
    );
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::GaussianNaiveBayes;

    fn frame_with(rows: Vec<(f64, i64, f64, Option<&str>)>) -> Frame {
        let columns = ["age_min", "piece_count", "list_price", "review_difficulty"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let rows = rows
            .into_iter()
            .map(|(age, pieces, price, label)| {
                vec![
                    Some(Value::Float(age)),
                    Some(Value::Integer(pieces)),
                    Some(Value::Float(price)),
                    label.map(Value::from),
                ]
            })
            .collect();
        Frame::from_rows(columns, rows)
    }

    #[test]
    fn only_null_labels_are_overwritten() {
        let mut frame = frame_with(vec![
            (6.0, 50, 20.0, Some("Easy")),
            (6.0, 60, 20.0, Some("Easy")),
            (6.0, 70, 20.0, Some("Hard")),
            (12.0, 900, 120.0, Some("Hard")),
            (12.0, 1000, 130.0, Some("Hard")),
            (12.0, 950, 125.0, None),
        ]);
        let filled = impute_difficulty(&mut frame, &mut GaussianNaiveBayes::new()).unwrap();
        assert_eq!(filled, vec![5]);
        assert_eq!(frame.get(5, 3), Some(&Value::from("Hard")));
        // A labelled row that the model would disagree with keeps its label.
        assert_eq!(frame.get(2, 3), Some(&Value::from("Hard")));
        assert_eq!(frame.get(1, 3), Some(&Value::from("Easy")));
    }

    #[test]
    fn null_feature_is_a_precondition_violation() {
        let mut frame = frame_with(vec![(6.0, 50, 20.0, Some("Easy")), (6.0, 60, 20.0, None)]);
        frame.set(0, 2, None);
        let err = impute_difficulty(&mut frame, &mut GaussianNaiveBayes::new()).unwrap_err();
        match err {
            PipelineError::PreconditionViolation { column, row_id } => {
                assert_eq!(column, "list_price");
                assert_eq!(row_id, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_to_fill_skips_training() {
        let mut frame = frame_with(vec![(6.0, 50, 20.0, Some("Easy"))]);
        frame.set(0, 0, None);
        let filled = impute_difficulty(&mut frame, &mut GaussianNaiveBayes::new()).unwrap();
        assert!(filled.is_empty());
    }

    #[test]
    fn no_labelled_rows_leaves_nulls_for_the_report() {
        let mut frame = frame_with(vec![(6.0, 50, 20.0, None), (12.0, 900, 120.0, None)]);
        let filled = impute_difficulty(&mut frame, &mut GaussianNaiveBayes::new()).unwrap();
        assert!(filled.is_empty());
        assert_eq!(frame.null_count(3), 2);
        let unresolved = crate::impute::unresolved_nulls(&frame, &[fields::REVIEW_DIFFICULTY]);
        assert_eq!(unresolved[0].row_ids, vec![0, 1]);
    }
}
