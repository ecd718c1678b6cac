use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed raw payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown source adapter(s): {0}")]
    UnknownSource(String),

    #[error("Source error: {message}")]
    Source { message: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
