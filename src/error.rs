#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("serialization of stored value failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::num::ParseIntError> for MapError {
    fn from(err: std::num::ParseIntError) -> Self {
        MapError::ConfigError(format!("Invalid integer: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
