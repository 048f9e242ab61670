use thiserror::Error;

/// Every failure the loader, the aggregation engine and the model can report.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Column not found in dataset: {0}")]
    ColumnNotFound(String),
    #[error("Cannot parse {value:?} as a number (column {column:?}, row {row})")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Row {row} has no Region value")]
    MissingRegion { row: usize },
    #[error("Column {0:?} is not numeric")]
    NotNumeric(String),
    #[error("Column {0:?} is not a text column")]
    NotText(String),
    #[error("Column {column:?} has {got} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        got: usize,
    },
    #[error("Region {region:?} has no values in column {column:?} to impute from")]
    DegenerateGroup { column: String, region: String },
    #[error("Model expects {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("Invalid input format: {0:?}")]
    InvalidFeature(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
