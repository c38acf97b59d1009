//! Probabilistic classifiers used for supervised imputation.
//!
//! The classifier sees only feature matrices and labels; it knows nothing
//! about frames, so any implementation of [`Classifier`] can be swapped in
//! without touching the imputation plumbing.

use std::{collections::BTreeMap, f64::consts::PI};

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{PipelineError, Result};

pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[String]) -> Result<()>;
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>>;
}

/// Trains `classifier` on the labelled rows and predicts a label for every
/// row of `predict_x`.
pub fn predict_labels<C: Classifier + ?Sized>(
    classifier: &mut C,
    train_x: &Array2<f64>,
    train_y: &[String],
    predict_x: &Array2<f64>,
) -> Result<Vec<String>> {
    classifier.fit(train_x, train_y)?;
    classifier.predict(predict_x)
}

/// Gaussian Naive Bayes over continuous features.
#[derive(Debug, Clone)]
pub struct GaussianNaiveBayes {
    classes: Vec<String>,
    /// Per-class feature means, one row per class.
    means: Array2<f64>,
    /// Per-class feature variances, smoothed.
    variances: Array2<f64>,
    log_priors: Array1<f64>,
    /// Fraction of the largest feature variance added to every variance.
    var_smoothing: f64,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            means: Array2::zeros((0, 0)),
            variances: Array2::zeros((0, 0)),
            log_priors: Array1::zeros(0),
            var_smoothing: 1e-9,
        }
    }

    pub fn with_var_smoothing(mut self, smoothing: f64) -> Self {
        self.var_smoothing = smoothing;
        self
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn joint_log_likelihood(&self, row: ArrayView1<f64>) -> Array1<f64> {
        let mut scores = self.log_priors.clone();
        for (class_idx, score) in scores.iter_mut().enumerate() {
            let means = self.means.row(class_idx);
            let vars = self.variances.row(class_idx);
            *score += row
                .iter()
                .zip(means.iter())
                .zip(vars.iter())
                .map(|((&x, &mean), &var)| {
                    -0.5 * ((x - mean).powi(2) / var + var.ln() + (2.0 * PI).ln())
                })
                .sum::<f64>();
        }
        scores
    }
}

impl Classifier for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &[String]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::FeatureShape {
                expected: y.len(),
                found: x.nrows(),
            });
        }
        if y.is_empty() {
            return Err(PipelineError::EmptyTrainingSet {
                column: "labels".to_string(),
            });
        }

        let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, label) in y.iter().enumerate() {
            members.entry(label.as_str()).or_default().push(idx);
        }

        let n_features = x.ncols();
        let epsilon = self.var_smoothing
            * x.var_axis(Axis(0), 0.0)
                .iter()
                .copied()
                .fold(0.0f64, f64::max)
                .max(1.0);

        self.classes = members.keys().map(|k| k.to_string()).collect();
        self.means = Array2::zeros((members.len(), n_features));
        self.variances = Array2::zeros((members.len(), n_features));
        self.log_priors = Array1::zeros(members.len());

        for (class_idx, rows) in members.values().enumerate() {
            let subset = x.select(Axis(0), rows);
            let count = rows.len() as f64;
            for feature in 0..n_features {
                let column = subset.column(feature);
                let mean = column.sum() / count;
                let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
                self.means[[class_idx, feature]] = mean;
                self.variances[[class_idx, feature]] = var + epsilon;
            }
            self.log_priors[class_idx] = (count / y.len() as f64).ln();
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        if self.classes.is_empty() {
            return Err(PipelineError::NotFitted);
        }
        if x.ncols() != self.means.ncols() {
            return Err(PipelineError::FeatureShape {
                expected: self.means.ncols(),
                found: x.ncols(),
            });
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let scores = self.joint_log_likelihood(row);
                let best = scores
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.total_cmp(b))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0);
                self.classes[best].clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn separates_two_gaussian_clusters() {
        let x = array![
            [1.0, 10.0],
            [1.2, 11.0],
            [0.8, 9.0],
            [5.0, 50.0],
            [5.5, 52.0],
            [4.5, 48.0]
        ];
        let y = labels(&["low", "low", "low", "high", "high", "high"]);
        let mut model = GaussianNaiveBayes::new();
        let predicted =
            predict_labels(&mut model, &x, &y, &array![[1.1, 10.5], [5.2, 49.0]]).unwrap();
        assert_eq!(predicted, labels(&["low", "high"]));
        assert_eq!(model.classes(), labels(&["high", "low"]).as_slice());
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = GaussianNaiveBayes::new();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(PipelineError::NotFitted)
        ));
    }

    #[test]
    fn feature_count_must_match() {
        let mut model = GaussianNaiveBayes::new();
        model
            .fit(&array![[1.0, 2.0], [2.0, 3.0]], &labels(&["a", "b"]))
            .unwrap();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(PipelineError::FeatureShape { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn constant_features_do_not_break_scoring() {
        let x = array![[3.0, 10.0], [3.0, 20.0], [3.0, 400.0], [3.0, 500.0]];
        let y = labels(&["easy", "easy", "hard", "hard"]);
        let mut model = GaussianNaiveBayes::new();
        let predicted = predict_labels(&mut model, &x, &y, &array![[3.0, 15.0], [3.0, 450.0]])
            .unwrap();
        assert_eq!(predicted, labels(&["easy", "hard"]));
    }
}
