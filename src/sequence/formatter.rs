//! Build call sequence strings from the live stack.
//!
//! Format: "outer -> middle -> inner"
//!
//! Example: "gears::Train.run:40 -> gears::Spur.mesh:12 -> gears.helper:3"
//! This means: Train.run called Spur.mesh which called helper.

use crate::inspector::{CallerInfo, FrameInspector};
use crate::stack::{self, Receiver};
use crate::utils::config::{DiagConfig, CHAIN_SEPARATOR};
use log::trace;

/// Renders windows of the current thread's call stack
///
/// **Public** - cheap to clone
#[derive(Debug, Clone)]
pub struct SequenceFormatter {
    inspector: FrameInspector,
    default_depth: usize,
}

impl SequenceFormatter {
    pub fn new(inspector: FrameInspector, config: &DiagConfig) -> Self {
        Self {
            inspector,
            default_depth: config.caller_depth,
        }
    }

    pub fn inspector(&self) -> &FrameInspector {
        &self.inspector
    }

    /// Depth used by [`format_default`](Self::format_default)
    pub fn default_depth(&self) -> usize {
        self.default_depth
    }

    /// Render a window of the caller's stack
    ///
    /// **Public** - main entry point for call sequences
    ///
    /// # Arguments
    /// * `latest` - innermost frames to skip, starting at the caller
    /// * `depth` - frames to include after the skip
    ///
    /// # Returns
    /// Entries joined with `" -> "`, outermost on the left. Missing
    /// frames shorten the chain; the result may be empty.
    pub fn format_call_sequence(&self, latest: usize, depth: usize) -> String {
        let _frame = stack::enter(
            file!(),
            module_path!(),
            "SequenceFormatter.format_call_sequence",
            line!(),
            Receiver::None,
        );
        // Offset 0 is this function's own frame.
        join_chain(&self.collect(latest.saturating_add(1), depth))
    }

    /// Render `default_depth` frames of the caller's stack
    pub fn format_default(&self, latest: usize) -> String {
        let _frame = stack::enter(
            file!(),
            module_path!(),
            "SequenceFormatter.format_default",
            line!(),
            Receiver::None,
        );
        join_chain(&self.collect(latest.saturating_add(1), self.default_depth))
    }

    /// Resolved window of the caller's stack, innermost first
    pub fn callers(&self, latest: usize, depth: usize) -> Vec<CallerInfo> {
        let _frame = stack::enter(
            file!(),
            module_path!(),
            "SequenceFormatter.callers",
            line!(),
            Receiver::None,
        );
        self.collect(latest.saturating_add(1), depth)
    }

    /// Resolve up to `depth` frames starting `skip` levels above the
    /// innermost frame
    ///
    /// Stops at the first missing or unresolvable frame. Returns nothing
    /// if the stack cannot be inspected at all.
    pub(crate) fn collect(&self, skip: usize, depth: usize) -> Vec<CallerInfo> {
        let mut window = Vec::with_capacity(depth.min(64));

        for i in 0..depth {
            let offset = match skip.checked_add(i) {
                Some(offset) => offset,
                None => break,
            };
            let handle = match stack::frame_at(offset) {
                Ok(Some(handle)) => handle,
                Ok(None) => break,
                Err(_) => return Vec::new(),
            };
            match self.inspector.resolve(handle) {
                Ok(info) => window.push(info),
                Err(_) => break,
            }
        }

        trace!(
            "Collected {} of {} frames after skipping {}",
            window.len(),
            depth,
            skip
        );
        window
    }
}

/// Render one chain entry
pub fn render_entry(info: &CallerInfo) -> String {
    info.to_string()
}

/// Join an innermost-first window into a chain, outermost on the left
pub fn join_chain(window: &[CallerInfo]) -> String {
    window
        .iter()
        .rev()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join(CHAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_chain_orders_outermost_first() {
        let window = vec![
            CallerInfo::new("m", "", "inner", 3),
            CallerInfo::new("m", "C", "middle", 2),
            CallerInfo::new("m", "", "outer", 1),
        ];
        assert_eq!(
            join_chain(&window),
            "m.outer:1 -> m::C.middle:2 -> m.inner:3"
        );
    }

    #[test]
    fn test_join_chain_empty_and_single() {
        assert_eq!(join_chain(&[]), "");
        assert_eq!(join_chain(&[CallerInfo::new("m", "", "f", 9)]), "m.f:9");
    }
}
