use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type '{0}' (expected .html, .eml or .msg)")]
    UnknownExtension(String),

    #[error("Could not parse email container: {0}")]
    Malformed(String),

    #[error("Could not extract content from this email")]
    EmptyContent,
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("AI review request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI review service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI review service returned no content")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Scan(#[from] mailqa_scanner::ScanError),
}
