//! Callchain Diag
//!
//! Reports "where am I in the call chain" for participating code:
//! resolve a frame to its module, class, function and line, render a
//! window of the current thread's stack as an arrow-joined chain, and
//! print timestamped diagnostic lines that include it.
//!
//! ## Getting Started
//!
//! ```ignore
//! use callchain_diag::{enter, diag, participant, Emitter, DiagConfig, ScopeRegistry};
//!
//! struct Gear;
//! participant!(Gear);
//!
//! impl Gear {
//!     fn spin(&self, emitter: &Emitter) -> std::io::Result<()> {
//!         let _frame = enter!("Gear.spin", recv = self);
//!         diag!(emitter; "spinning")
//!     }
//! }
//! ```

pub mod inspector;
pub mod output;
pub mod sequence;
pub mod stack;
pub mod utils;

pub use inspector::{CallerInfo, FrameInspector, ScopeKind, ScopeRegistry};
pub use output::{EmitOptions, Emitter, OutputTarget};
pub use sequence::SequenceFormatter;
pub use stack::{ClassName, Dispatch, ExplicitBase, FrameGuard, FrameHandle, Participant, Receiver};
pub use utils::config::{load_config, DiagConfig};
pub use utils::error::{ConfigError, FrameResolutionError, RegistryError, StackUnavailable};
