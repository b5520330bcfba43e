use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        ScoutError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
