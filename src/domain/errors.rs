use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("failed to read PDF {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },

    #[error("invalid row data: {0}")]
    InvalidRows(String),

    #[error("duplicate row id '{0}'")]
    DuplicateId(String),

    #[error("invalid mapping suggestion: {0}")]
    InvalidSuggestion(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("file rejected: {0}")]
    FileRejected(String),
}

pub type EditorResult<T> = Result<T, EditorError>;
