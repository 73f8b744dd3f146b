use serde_json::Value;

/// An error raised while submitting a record to InfluxDB
#[derive(thiserror::Error, Debug)]
pub enum InfluxError {
    #[error("Failed to send the write request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("InfluxDB rejected the write: HTTP {status}: {message}")]
    ErrorResponse { status: u16, message: String },

    #[error("Unsupported value for field {field:?}: line protocol cannot encode {value}")]
    UnsupportedFieldValue { field: String, value: Value },

    #[error("Empty record: a line protocol record requires at least one field")]
    EmptyRecord,
}
