use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid root margin: {0}")]
    InvalidRootMargin(String),

    #[error("Invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("Frame clock ticked from inside one of its own subscribers")]
    ClockReentrancy,

    #[error("Frame subscriber failed: {0}")]
    Subscriber(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for option validation failures
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
