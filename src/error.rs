use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing source file {path:?}: {source}")]
    MissingFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: PolarsError,
    },
    #[error("{source_name} has {found} columns, expected {expected}")]
    SchemaMismatch {
        source_name: String,
        expected: usize,
        found: usize,
    },
    #[error("no rows in group {group:?}")]
    EmptyGroup { group: String },
    #[error("failed to render {chart}: {message}")]
    Render { chart: &'static str, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub fn empty_group(group: impl Into<String>) -> Self {
        PipelineError::EmptyGroup { group: group.into() }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
