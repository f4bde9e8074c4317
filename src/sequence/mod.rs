//! Call sequence windowing and rendering.
//!
//! Walks the current thread's stack from the innermost frame outward,
//! applies a `(latest, depth)` window and renders the selected frames as
//! an arrow-joined chain, outermost first.

pub mod formatter;

// Re-export main types and functions
pub use formatter::{join_chain, render_entry, SequenceFormatter};
