use shared::Step;
use thiserror::Error;

/// Problems with the uploaded text itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvParseError {
    #[error("File is empty.")]
    EmptyFile,

    #[error("CSV must have a header row and at least one data row.")]
    InsufficientRows,

    #[error("CSV must have at least 2 columns.")]
    InsufficientColumns,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please upload a CSV file (.csv)")]
    NotCsv { file_name: String },

    #[error(transparent)]
    Parse(#[from] CsvParseError),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Violations that block the configure step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Name and price columns cannot be the same.")]
    SameColumn,

    #[error("Column {index} does not exist; the file has {columns} columns.")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("Home country {home} uses {home_currency}, not the base currency {base}.")]
    HomeCurrencyMismatch {
        home: String,
        home_currency: String,
        base: String,
    },
}

#[derive(Error, Debug)]
pub enum FxError {
    #[error("FX request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("FX service answered '{0}' instead of success")]
    Unsuccessful(String),

    #[error("Malformed FX response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot move from {from:?} to {to:?}: {reason}")]
    InvalidTransition { from: Step, to: Step, reason: String },

    #[error("No valid products found. Check your column selections.")]
    NoValidProducts,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),

    #[error("Unknown country '{0}'")]
    UnknownCountry(String),

    #[error("No product named '{0}'")]
    UnknownProduct(String),

    #[error("No product selected")]
    NoProductSelected,

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export buffer error: {0}")]
    Buffer(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Settings format error: {source}")]
    SettingsFormatError {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Fx(#[from] FxError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
