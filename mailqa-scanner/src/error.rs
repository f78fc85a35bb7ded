use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client setup failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid selector: {0}")]
    SelectorError(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
