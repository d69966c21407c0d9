#[derive(Debug, thiserror::Error)]
pub enum FundError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Serde YAML Error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Serde JSON Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Failed to parse date: {0}")]
    ParseDateError(#[from] chrono::ParseError),
    #[error("Configuration Error: {0}")]
    ConfigError(String),
    #[error("Input table is missing the mandatory column {column}.")]
    MissingColumn { column: String },
    #[error("Input table has no header row.")]
    EmptyInput,
    #[error("Row on line {line} has {got} fields but the header has {expected}.")]
    RaggedRow {
        line: u64,
        expected: usize,
        got: usize,
    },
}
