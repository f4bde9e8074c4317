//! Resolve a frame handle into a `CallerInfo`.

use super::caller_info::CallerInfo;
use super::registry::{last_segment, ScopeRegistry};
use crate::stack::{self, Dispatch, FrameHandle, FrameSnapshot, Receiver};
use crate::utils::error::FrameResolutionError;
use log::debug;
use std::sync::Arc;

/// Name reported for a frame whose path has no final segment
const ANONYMOUS_FUNCTION: &str = "<anonymous>";

/// Resolves frames against a shared scope registry
///
/// **Public** - cheap to clone, shares the registry
#[derive(Debug, Clone)]
pub struct FrameInspector {
    registry: Arc<ScopeRegistry>,
}

impl FrameInspector {
    pub fn new(registry: Arc<ScopeRegistry>) -> Self {
        Self { registry }
    }

    /// Registry used for path-based class lookup
    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    /// Resolve one live frame
    ///
    /// # Errors
    /// * `FrameResolutionError::Stale` - the frame has already returned
    /// * `FrameResolutionError::ForeignThread` - handle from another thread
    /// * `FrameResolutionError::Unavailable` - stack storage is inaccessible
    pub fn resolve(&self, handle: FrameHandle) -> Result<CallerInfo, FrameResolutionError> {
        let frame = stack::snapshot(handle).map_err(|err| {
            debug!("Cannot resolve frame at index {}: {}", handle.index(), err);
            err
        })?;
        Ok(self.resolve_snapshot(&frame))
    }

    /// Resolve frame data that has already been copied out
    pub fn resolve_snapshot(&self, frame: &FrameSnapshot) -> CallerInfo {
        let module_name = stack::module_name(frame.file);

        let function_name = match last_segment(frame.path) {
            "" => ANONYMOUS_FUNCTION,
            name => name,
        };

        CallerInfo {
            module_name: module_name.to_string(),
            class_name: self.class_name(frame).to_string(),
            function_name: function_name.to_string(),
            line_number: frame.line.max(1),
        }
    }

    /// Class owning the frame, first matching rule wins:
    /// 1. an instance receiver's runtime class (lexical class for an
    ///    explicit base dispatch)
    /// 2. a bound type
    /// 3. the innermost registered class enclosing the declaration
    ///
    /// Lexical lookups are keyed on the declaring module path, never on
    /// the rendered module name, which many files can share.
    fn class_name<'a>(&'a self, frame: &'a FrameSnapshot) -> &'a str {
        let module = frame.module_path;
        match frame.receiver {
            Receiver::Instance {
                class,
                dispatch: Dispatch::Dynamic,
            } => class,
            Receiver::Instance {
                dispatch: Dispatch::ExplicitBase,
                ..
            } => self.lexical_class(module, frame.path),
            Receiver::Type(class) => class,
            Receiver::None => self.lexical_class(module, frame.path),
        }
    }

    fn lexical_class<'p>(&self, module: &str, path: &'p str) -> &'p str {
        self.registry.enclosing_class(module, path).unwrap_or("")
    }
}
