use thiserror::Error;

#[derive(Error, Debug)]
pub enum LazybbError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open browser: {0}")]
    Open(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for LazybbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LazybbError::Decode(err.to_string())
        } else {
            LazybbError::Api(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, LazybbError>;
