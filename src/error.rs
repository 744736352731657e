//! Error types.

use thiserror::Error;

/// Failure talking to the relay control API.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid relay endpoint '{endpoint}'")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build relay HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to register stream '{name}'")]
    Request {
        name: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Configuration that parses but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("camera '{0}' is defined more than once")]
    DuplicateCamera(String),

    #[error("camera name '{0}' is reserved")]
    ReservedCameraName(String),

    #[error("camera '{0}' has no inputs")]
    NoInputs(String),

    #[error("birdseye size {width}x{height} is invalid")]
    BirdseyeSize { width: u32, height: u32 },

    #[error("camera '{camera}' detect settings are invalid: fps, width and height must be non-zero")]
    DetectSettings { camera: String },

    #[error("relay endpoint '{0}' is not a valid URL")]
    RelayEndpoint(String),
}
