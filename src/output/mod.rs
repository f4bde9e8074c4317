//! Diagnostic line output.
//!
//! This module handles:
//! - Composing timestamped call-chain lines
//! - Routing them to stdout, stderr or a caller's writer

pub mod emitter;
pub mod options;

// Re-export main types
pub use emitter::Emitter;
pub use options::{EmitOptions, OutputTarget};
