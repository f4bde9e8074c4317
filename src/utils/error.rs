//! Error types for the entire library.
//!
//! We use `thiserror` for library-style errors with custom types.
//! Write failures while emitting stay plain `std::io::Error` and are
//! passed through untouched.

use std::thread::ThreadId;
use thiserror::Error;

/// Errors that can occur while resolving a frame handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameResolutionError {
    #[error("stale frame handle: no live frame #{serial} at stack index {index}")]
    Stale { index: usize, serial: u64 },

    #[error("frame handle belongs to thread {owner:?}, resolved on {current:?}")]
    ForeignThread { owner: ThreadId, current: ThreadId },

    #[error("call stack storage is not accessible on this thread")]
    Unavailable,
}

impl From<StackUnavailable> for FrameResolutionError {
    fn from(_: StackUnavailable) -> Self {
        FrameResolutionError::Unavailable
    }
}

/// The stack-introspection primitive cannot be used on this thread
/// (its thread-local storage is being torn down).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("call stack introspection is unavailable")]
pub struct StackUnavailable;

/// Errors that can occur while building the scope registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("scope {module}::{path} already registered as a {existing}")]
    Conflict {
        module: String,
        path: String,
        existing: &'static str,
    },

    #[error("invalid declaration path: {0:?}")]
    InvalidPath(String),
}

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid datetime format {0:?}")]
    InvalidDateTimeFormat(String),

    #[error("caller depth must be at least 1")]
    InvalidDepth,
}
