//! Resolved frame record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One resolved stack frame
///
/// Equality is by value over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerInfo {
    /// Short name of the declaring source unit (no path, no extension)
    pub module_name: String,

    /// Owning class, or empty for free functions
    pub class_name: String,

    /// Simple (unqualified) function name
    pub function_name: String,

    /// Line currently executing in the frame, always >= 1
    pub line_number: u32,
}

impl CallerInfo {
    pub fn new(
        module_name: impl Into<String>,
        class_name: impl Into<String>,
        function_name: impl Into<String>,
        line_number: u32,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            class_name: class_name.into(),
            function_name: function_name.into(),
            line_number,
        }
    }

    /// True when the frame belongs to a class
    pub fn has_class(&self) -> bool {
        !self.class_name.is_empty()
    }
}

/// Chain entry form: `module::Class.function:line`, or
/// `module.function:line` without a class.
impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_class() {
            write!(
                f,
                "{}::{}.{}:{}",
                self.module_name, self.class_name, self.function_name, self.line_number
            )
        } else {
            write!(
                f,
                "{}.{}:{}",
                self.module_name, self.function_name, self.line_number
            )
        }
    }
}
