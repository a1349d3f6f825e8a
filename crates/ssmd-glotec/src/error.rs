use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlotecError>;

#[derive(Error, Debug)]
pub enum GlotecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Listing format error: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlotecError {
    /// Process exit code for this error. Configuration problems exit with 2,
    /// everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            GlotecError::Config(_) => 2,
            _ => 1,
        }
    }
}
