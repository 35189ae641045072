use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum MisrankError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported table format: {0} (expected .csv, .tsv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("required column missing: {0}")]
    MissingColumn(String),

    #[error("column validation failed:\n{0}")]
    ColumnValidation(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("missing setting: {0}")]
    MissingSetting(String),

    #[error("unknown predictor alias: {0}")]
    UnknownPredictor(String),

    #[error("annovar installation directory not found: {0}")]
    AnnovarDirMissing(String),

    #[error("annovar database directory not found: {0}")]
    DatabaseDirMissing(String),

    #[error("input conversion failed with status {status}: {stderr}")]
    ConversionFailed { status: i32, stderr: String },

    #[error("converted input did not appear: {0}")]
    ConversionOutputMissing(String),

    #[error("annotation failed with status {status}: {stderr}")]
    AnnotationFailed { status: i32, stderr: String },

    #[error("annotation failed: timed out after {0}s")]
    AnnotationTimedOut(u64),

    #[error("annotation succeeded but expected output is missing: {0}")]
    AnnotationOutputMissing(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MisrankError>;
