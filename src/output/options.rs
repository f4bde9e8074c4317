//! Per-call emit options and output targets.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Standard stream an emitted line goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
}

impl OutputTarget {
    /// Write `bytes` to the stream in one call and flush it
    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        match self {
            OutputTarget::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            OutputTarget::Stderr => {
                let mut out = io::stderr().lock();
                out.write_all(bytes)?;
                out.flush()
            }
        }
    }
}

/// Options for one emitted line
///
/// Unset fields fall back to the emitter's `DiagConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Frames of the caller's stack to show
    pub depth: Option<usize>,

    /// Timestamp pattern override
    pub datetime_format: Option<String>,

    /// Stream to write to
    pub target: OutputTarget,

    /// Line terminator override
    pub end: Option<String>,
}

impl EmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    pub fn with_target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }
}
