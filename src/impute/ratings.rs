//! Two-phase imputation of the three rating columns.
//!
//! Phase one copies `overall_rating` into a missing `play_rating` or
//! `value_rating`. Phase two replaces the whole rating triple of any row
//! that is still incomplete with a triple drawn uniformly, with
//! replacement, from the rows that were complete when phase two began.

use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use crate::{
    error::{Result, Stage},
    fields,
    frame::Frame,
    value::Cell,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingsOutcome {
    pub borrowed_play: usize,
    pub borrowed_value: usize,
    pub pool_size: usize,
    /// Rows whose triple was replaced by a sampled one.
    pub resampled: Vec<usize>,
    /// Rows left incomplete because the sampling pool was empty.
    pub unresolved: Vec<usize>,
}

fn rating_columns(frame: &Frame) -> Result<[usize; 3]> {
    Ok([
        frame.require_column(fields::PLAY_RATING, Stage::Impute)?,
        frame.require_column(fields::VALUE_RATING, Stage::Impute)?,
        frame.require_column(fields::OVERALL_RATING, Stage::Impute)?,
    ])
}

/// Phase one. Returns how many play and value cells were borrowed.
pub fn borrow_overall(frame: &mut Frame) -> Result<(usize, usize)> {
    let [play, value, overall] = rating_columns(frame)?;
    let mut borrowed = (0, 0);
    for pos in 0..frame.len() {
        let Some(overall_rating) = frame.get(pos, overall).cloned() else {
            continue;
        };
        if frame.get(pos, play).is_none() {
            frame.set(pos, play, Some(overall_rating.clone()));
            borrowed.0 += 1;
        }
        if frame.get(pos, value).is_none() {
            frame.set(pos, value, Some(overall_rating));
            borrowed.1 += 1;
        }
    }
    Ok(borrowed)
}

/// Phase two. The pool is fixed before any row is replaced.
pub fn hot_deck<R: Rng>(frame: &mut Frame, rng: &mut R) -> Result<RatingsOutcome> {
    let columns = rating_columns(frame)?;
    let triple = |frame: &Frame, pos: usize| -> [Cell; 3] {
        columns.map(|col| frame.get(pos, col).cloned())
    };

    let mut pool = Vec::new();
    let mut incomplete = Vec::new();
    for pos in 0..frame.len() {
        let values = triple(&*frame, pos);
        if values.iter().all(Option::is_some) {
            pool.push(values);
        } else {
            incomplete.push(pos);
        }
    }

    let mut outcome = RatingsOutcome {
        pool_size: pool.len(),
        ..RatingsOutcome::default()
    };
    if pool.is_empty() {
        outcome.unresolved = incomplete.iter().map(|pos| frame.row_ids()[*pos]).collect();
        if !outcome.unresolved.is_empty() {
            warn!(
                "No complete rating triple available; {} row(s) left incomplete",
                outcome.unresolved.len()
            );
        }
        return Ok(outcome);
    }

    for pos in incomplete {
        let sampled = &pool[rng.gen_range(0..pool.len())];
        for (col, cell) in columns.iter().zip(sampled.iter()) {
            frame.set(pos, *col, cell.clone());
        }
        outcome.resampled.push(frame.row_ids()[pos]);
    }
    Ok(outcome)
}

pub fn impute_ratings<R: Rng>(frame: &mut Frame, rng: &mut R) -> Result<RatingsOutcome> {
    let (borrowed_play, borrowed_value) = borrow_overall(frame)?;
    let mut outcome = hot_deck(frame, rng)?;
    outcome.borrowed_play = borrowed_play;
    outcome.borrowed_value = borrowed_value;
    info!(
        "Ratings: borrowed {} play and {} value rating(s) from overall; resampled {} row(s) from a pool of {}",
        outcome.borrowed_play,
        outcome.borrowed_value,
        outcome.resampled.len(),
        outcome.pool_size
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use rand::{SeedableRng, rngs::StdRng};

    fn ratings(rows: &[[Option<f64>; 3]]) -> Frame {
        Frame::from_rows(
            fields::RATING_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.map(Value::Float)).collect())
                .collect(),
        )
    }

    #[test]
    fn overall_fills_both_subscales_without_sampling() {
        let mut frame = ratings(&[
            [None, None, Some(4.0)],
            [Some(2.0), Some(3.0), Some(1.0)],
            [Some(5.0), Some(5.0), Some(5.0)],
        ]);
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = impute_ratings(&mut frame, &mut rng).unwrap();
        assert_eq!(
            frame.row(0),
            [
                Some(Value::Float(4.0)),
                Some(Value::Float(4.0)),
                Some(Value::Float(4.0))
            ]
        );
        assert_eq!(outcome.borrowed_play, 1);
        assert_eq!(outcome.borrowed_value, 1);
        assert!(outcome.resampled.is_empty());
    }

    #[test]
    fn missing_triple_is_copied_from_the_pool() {
        let original = [
            [Some(2.0), Some(3.0), Some(1.0)],
            [Some(4.5), Some(4.0), Some(5.0)],
        ];
        let mut rows = original.to_vec();
        rows.push([None, None, None]);
        rows.push([Some(3.0), None, None]);
        let mut frame = ratings(&rows);
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = impute_ratings(&mut frame, &mut rng).unwrap();
        assert_eq!(outcome.pool_size, 2);
        assert_eq!(outcome.resampled, vec![2, 3]);

        let pool = ratings(&original);
        for pos in [2, 3] {
            assert!(
                pool.rows().iter().any(|row| row.as_slice() == frame.row(pos)),
                "row {pos} should match a pool triple"
            );
        }
    }

    #[test]
    fn same_seed_gives_same_result() {
        let rows = [
            [Some(1.0), Some(1.0), Some(1.0)],
            [Some(2.0), Some(2.0), Some(2.0)],
            [Some(3.0), Some(3.0), Some(3.0)],
            [None, None, None],
            [None, Some(2.0), None],
        ];
        let mut first = ratings(&rows);
        let mut second = ratings(&rows);
        impute_ratings(&mut first, &mut StdRng::seed_from_u64(99)).unwrap();
        impute_ratings(&mut second, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_pool_leaves_rows_unresolved() {
        let mut frame = ratings(&[[None, None, None]]);
        let outcome = impute_ratings(&mut frame, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(outcome.unresolved, vec![0]);
        let empty: [Cell; 3] = [None, None, None];
        assert_eq!(frame.row(0), empty);
    }
}
