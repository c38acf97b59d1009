//! Stage-tagged errors raised by the pipeline stages.
//!
//! Structural failures (unexpected file names, schemas that do not line up,
//! age ranges that cannot be parsed) abort the run at the stage boundary.
//! Data-quality findings such as unresolved nulls are not errors; they are
//! logged and collected in the run report instead.

use std::{fmt, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Reconcile,
    Merge,
    Clean,
    Impute,
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Reconcile => "reconcile",
            Stage::Merge => "merge",
            Stage::Clean => "clean",
            Stage::Impute => "impute",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("[{stage}] accessing {path:?}: {source}")]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[load] parsing record file {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("[load] record file {path:?} is not a flat key/value object: {reason}")]
    InvalidRecord { path: PathBuf, reason: String },

    #[error(
        "[load] malformed file name {path:?}: expected '<product_id>{delimiter}<country_code>'"
    )]
    MalformedFilename { path: PathBuf, delimiter: char },

    #[error("[reconcile] renaming '{from}' to '{to}' would collide with an existing column")]
    RenameCollision { from: String, to: String },

    #[error(
        "[{stage}] column sets differ after reconciliation: only in first {only_first:?}, only in second {only_second:?}"
    )]
    ReconciliationIncomplete {
        stage: Stage,
        only_first: Vec<String>,
        only_second: Vec<String>,
    },

    #[error("[{stage}] required column '{column}' is missing")]
    MissingColumn { stage: Stage, column: String },

    #[error("[clean] column '{column}' row {row_id}: cannot interpret {value:?} as {expected}")]
    InvalidValue {
        column: String,
        row_id: usize,
        value: String,
        expected: &'static str,
    },

    #[error("[clean] row {row_id}: malformed age range {value:?}")]
    MalformedRange { row_id: usize, value: String },

    #[error("[impute] precondition violated: column '{column}' is null or non-numeric at row {row_id}")]
    PreconditionViolation { column: String, row_id: usize },

    #[error("[impute] classifier has no labelled rows to train on for '{column}'")]
    EmptyTrainingSet { column: String },

    #[error("[impute] classifier expects {expected} feature(s) but received {found}")]
    FeatureShape { expected: usize, found: usize },

    #[error("[impute] classifier used before it was fitted")]
    NotFitted,

    #[error("[export] CSV error on {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Json { .. }
            | PipelineError::InvalidRecord { .. }
            | PipelineError::MalformedFilename { .. } => Stage::Load,
            PipelineError::RenameCollision { .. } => Stage::Reconcile,
            PipelineError::Io { stage, .. }
            | PipelineError::ReconciliationIncomplete { stage, .. }
            | PipelineError::MissingColumn { stage, .. } => *stage,
            PipelineError::InvalidValue { .. } | PipelineError::MalformedRange { .. } => {
                Stage::Clean
            }
            PipelineError::PreconditionViolation { .. }
            | PipelineError::EmptyTrainingSet { .. }
            | PipelineError::FeatureShape { .. }
            | PipelineError::NotFitted => Stage::Impute,
            PipelineError::Csv { .. } => Stage::Export,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
