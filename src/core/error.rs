use thiserror::Error;

#[derive(Error, Debug)]
pub enum DerbyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Race driver has shut down")]
    DriverClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DerbyError>;
