use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status code {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid url '{input}': {source}")]
    InvalidUrl {
        input: String,
        source: url::ParseError,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl ServiceError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
