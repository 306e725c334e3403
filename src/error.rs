//! Error taxonomy for loading, evaluating and driving a csvtool invocation.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading the input table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("unknown encoding '{label}'")]
    UnknownEncoding { label: String },

    #[error("{0:#}")]
    Format(#[source] anyhow::Error),
}

/// Failures raised while parsing or applying `--where` and `--aggregate` expressions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("invalid expression '{expression}', expected '{expected}'")]
    InvalidExpression {
        expression: String,
        expected: &'static str,
    },

    #[error("column '{0}' not found in CSV")]
    ColumnNotFound(String),

    #[error("incompatible types: cannot compare '{value}' with numeric column '{column}'")]
    TypeMismatch { column: String, value: String },

    #[error("operator '{operator}' is not supported for string column '{column}', only '=' is")]
    UnsupportedOperator { column: String, operator: char },

    #[error("unknown aggregate function '{0}', expected one of avg, min, max")]
    UnknownFunction(String),

    #[error("only numeric columns can be aggregated, column '{column}' contains '{value}'")]
    NonNumericColumn { column: String, value: String },

    #[error("no rows to aggregate")]
    EmptyInput,
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Pipeline failure tagged with the stage that produced it.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read CSV: {0}")]
    Load(#[source] LoadError),

    #[error("Filter error: {0}")]
    Filter(#[source] EvalError),

    #[error("Aggregate error: {0}")]
    Aggregate(#[source] EvalError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } | CliError::Load(_) => 1,
            CliError::Filter(_) | CliError::Aggregate(_) => 2,
        }
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound { path } => CliError::NotFound { path },
            other => CliError::Load(other),
        }
    }
}
