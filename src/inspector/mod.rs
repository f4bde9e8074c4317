//! Frame resolution.
//!
//! This module turns a frame handle into a `CallerInfo`:
//! - Module and function names from the frame's declaration
//! - The owning class, from the receiver or the scope registry
//! - The line the frame is executing

pub mod caller_info;
pub mod registry;
pub mod resolver;

// Re-export main types
pub use caller_info::CallerInfo;
pub use registry::{ScopeKind, ScopeRegistry};
pub use resolver::FrameInspector;
