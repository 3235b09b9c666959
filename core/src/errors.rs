use thiserror::Error;

use crate::outcome::RelayOutcome;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Device channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {origin}: {error}")]
    LoadFailed {
        origin: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Failed to build request URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Failed to build HTTP client: {reason}")]
    ClientCreation { reason: String },

    #[error("Request to the upstream server failed")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("Response body is not valid JSON: {reason}")]
    MalformedBody { reason: String },
}

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Device channel is closed")]
    Closed,

    #[error("Malformed device event: {reason}")]
    MalformedEvent { reason: String },

    #[error("Failed to deliver message to the device")]
    Send {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to read from the device")]
    Receive {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl From<serde_yaml::Error> for RelayError {
    fn from(err: serde_yaml::Error) -> Self {
        RelayError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl UpstreamError {
    /// The reply a device gets when a dispatch ends in this error.
    pub fn outcome(&self) -> RelayOutcome {
        match self {
            UpstreamError::MalformedBody { .. } => RelayOutcome::BadResponse,
            UpstreamError::InvalidUrl { .. }
            | UpstreamError::ClientCreation { .. }
            | UpstreamError::Transport { .. } => RelayOutcome::ServerError,
        }
    }
}

impl RelayError {
    /// Channel closure ends the relay loop cleanly rather than as a failure.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, RelayError::Channel(ChannelError::Closed))
    }
}
