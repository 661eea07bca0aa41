use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SckannerError {
    #[error("{0}")]
    GeneralError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("failed to fetch {resource}: {reason}")]
    FetchError { resource: String, reason: String },

    #[error(transparent)]
    StartupError(#[from] StartupError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<String> for SckannerError {
    fn from(error: String) -> SckannerError {
        SckannerError::GeneralError(error)
    }
}

/// Every named startup resource that could not be loaded.
///
/// Startup aborts when any resource fails; the partial data is discarded.
#[derive(Debug, Default)]
pub struct StartupError {
    pub failures: Vec<(String, String)>,
}

impl StartupError {
    pub fn new() -> StartupError {
        StartupError::default()
    }

    pub fn push(&mut self, resource: &str, reason: String) {
        self.failures.push((resource.to_string(), reason));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let details = self
            .failures
            .iter()
            .map(|(resource, reason)| format!("{}: {}", resource, reason))
            .collect::<Vec<String>>()
            .join("; ");
        write!(f, "failed to load startup data ({})", details)
    }
}

impl std::error::Error for StartupError {}
