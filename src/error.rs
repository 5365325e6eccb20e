use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Unsupported file type: {0}. Only CSV, JSON and JSONL are accepted.")]
    UnsupportedFormat(String),
    #[error("Invalid JSON document: {0}")]
    MalformedDocument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Serialize for BatchError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for BatchError {
    fn from(e: reqwest::Error) -> Self {
        BatchError::Inference(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_as_message() {
        let err = BatchError::UnsupportedFormat(".txt".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Unsupported file type: .txt"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BatchError = io.into();
        assert!(matches!(err, BatchError::Io(_)));
        assert_eq!(err.to_string(), "IO error: missing");
    }
}
