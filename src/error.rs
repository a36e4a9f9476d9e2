use thiserror::Error;

/// Reasons a single file load is abandoned.
///
/// None of these mutate the session: a failed load leaves the registry and the
/// selection exactly as they were before the attempt.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("upload is empty")]
    EmptyUpload,

    #[error("could not decode file: {0}")]
    Decode(String),

    #[error("header not found: no line is followed by an all-numeric row")]
    HeaderNotFound,

    #[error("duplicate column name '{0}' after trimming whitespace")]
    DuplicateColumnName(String),

    #[error("no data rows left after skipping {skipped} row(s)")]
    EmptyTable { skipped: usize },

    #[error("failed to parse table: {0}")]
    Parse(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Short stable name used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::EmptyUpload => "empty_upload",
            LoadError::Decode(_) => "decode",
            LoadError::HeaderNotFound => "header_not_found",
            LoadError::DuplicateColumnName(_) => "duplicate_column_name",
            LoadError::EmptyTable { .. } => "empty_table",
            LoadError::Parse(_) => "parse",
            LoadError::Io(_) => "io",
        }
    }
}

impl From<polars::prelude::PolarsError> for LoadError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        LoadError::Parse(e.to_string())
    }
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
