//! Per-thread shadow call stack.
//!
//! Participating functions enter a frame on entry and keep the returned
//! guard alive for the duration of the call. This module handles:
//! - Pushing and popping frames (RAII guards)
//! - Tracking the line each frame is currently executing
//! - Handing out frame handles by offset from the innermost frame
//! - Describing the receiver a call was made against

pub mod frame;
pub mod participant;

// Re-export main types
pub use frame::{
    checkpoint, depth, enter, frame_at, module_name, snapshot, FrameGuard, FrameHandle,
    FrameSnapshot,
};
pub use participant::{ClassName, Dispatch, ExplicitBase, Participant, Receiver};
