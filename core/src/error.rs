use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source file not found: {path}")]
    SourceMissing { path: String },

    #[error("Sheet '{sheet}' not found in source")]
    SheetNotFound { sheet: String },

    #[error("Column '{name}' not found")]
    MissingColumn { name: String },

    #[error("Sources share no usable 'numero_processo' key and the merge policy requires one")]
    KeylessMerge,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
