//! Error types for the free-play simulation.
//!
//! Fallible operations return `Result<T>`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FreePlayError {
    /// Audio input device unavailable or permission denied.
    #[error("audio device error: {0}")]
    Device(String),

    /// A simulation parameter violates its invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A listening trigger arrived while no body set exists.
    #[error("free play mode is not active")]
    NotInFreePlay,

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the expected schema.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, FreePlayError>;
