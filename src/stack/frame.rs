//! Frame storage, guards and the stack-introspection primitive.
//!
//! Each thread owns one stack of frame records. Every record carries a
//! process-unique serial so a handle can tell a live frame from a slot
//! that has since been reused.

use super::participant::Receiver;
use crate::utils::error::{FrameResolutionError, StackUnavailable};
use log::trace;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

static FRAME_SERIAL: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct FrameRecord {
    serial: u64,
    file: &'static str,
    module_path: &'static str,
    path: &'static str,
    receiver: Receiver,
    line: Cell<u32>,
}

thread_local! {
    static STACK: RefCell<Vec<FrameRecord>> = const { RefCell::new(Vec::new()) };
}

/// Identifies one live frame on one thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    thread: ThreadId,
    index: usize,
    serial: u64,
}

impl FrameHandle {
    /// Position from the bottom of the owning thread's stack
    pub fn index(&self) -> usize {
        self.index
    }

    /// Thread whose stack holds this frame
    pub fn thread(&self) -> ThreadId {
        self.thread
    }
}

/// Copy of one frame's data taken at resolution time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSnapshot {
    /// Declaring source file, as given by `file!()`
    pub file: &'static str,
    /// Declaring module, as given by `module_path!()`
    pub module_path: &'static str,
    /// Dotted declaration path, e.g. `outer.Inner.method`
    pub path: &'static str,
    pub receiver: Receiver,
    pub line: u32,
}

/// Keeps a frame on the stack until dropped
///
/// Guards are tied to the thread that created them.
#[must_use = "the frame is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct FrameGuard {
    serial: u64,
    _not_send: PhantomData<*const ()>,
}

impl FrameGuard {
    /// Guard that owns no frame
    pub(crate) fn inert() -> Self {
        Self {
            serial: 0,
            _not_send: PhantomData,
        }
    }

    /// Serial number of the guarded frame (0 if it could not be pushed)
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Record the line this frame is currently executing
    pub fn set_line(&self, line: u32) {
        let serial = self.serial;
        let _ = STACK.try_with(|stack| {
            if let Ok(stack) = stack.try_borrow() {
                if let Some(record) = stack.iter().rev().find(|r| r.serial == serial) {
                    record.line.set(line);
                }
            }
        });
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.serial == 0 {
            return;
        }
        let serial = self.serial;
        let _ = STACK.try_with(|stack| {
            if let Ok(mut stack) = stack.try_borrow_mut() {
                // Anything above this frame was leaked by its guard; drop it too.
                if let Some(pos) = stack.iter().rposition(|r| r.serial == serial) {
                    trace!("pop frame #{} ({})", serial, stack[pos].path);
                    stack.truncate(pos);
                }
            }
        });
    }
}

/// Push a frame for the current call
///
/// **Public** - usually reached through the `enter!` macro
///
/// # Arguments
/// * `file` - Declaring source file (`file!()`)
/// * `module_path` - Declaring module (`module_path!()`)
/// * `path` - Dotted declaration path ending in the function name
/// * `line` - Line the call starts executing at
/// * `receiver` - Instance or type the call is bound to, if any
///
/// If the thread's stack storage is gone the returned guard is inert.
pub fn enter(
    file: &'static str,
    module_path: &'static str,
    path: &'static str,
    line: u32,
    receiver: Receiver,
) -> FrameGuard {
    let serial = FRAME_SERIAL.fetch_add(1, Ordering::Relaxed);
    let pushed = STACK
        .try_with(|stack| match stack.try_borrow_mut() {
            Ok(mut stack) => {
                stack.push(FrameRecord {
                    serial,
                    file,
                    module_path,
                    path,
                    receiver,
                    line: Cell::new(line),
                });
                true
            }
            Err(_) => false,
        })
        .unwrap_or(false);

    if !pushed {
        return FrameGuard::inert();
    }
    trace!("push frame #{} ({})", serial, path);
    FrameGuard {
        serial,
        _not_send: PhantomData,
    }
}

/// Update the line of the innermost frame on this thread
pub fn checkpoint(line: u32) {
    let _ = STACK.try_with(|stack| {
        if let Ok(stack) = stack.try_borrow() {
            if let Some(record) = stack.last() {
                record.line.set(line);
            }
        }
    });
}

/// Number of frames currently on this thread's stack
pub fn depth() -> Result<usize, StackUnavailable> {
    STACK
        .try_with(|stack| stack.try_borrow().map(|s| s.len()).map_err(|_| StackUnavailable))
        .map_err(|_| StackUnavailable)?
}

/// Handle to the frame `offset` levels above the innermost one
///
/// **Public** - the stack-introspection primitive
///
/// # Returns
/// * `Ok(Some(handle))` - a frame exists at that offset
/// * `Ok(None)` - the offset runs past the bottom of the stack
///
/// # Errors
/// * `StackUnavailable` - thread-local storage cannot be accessed
pub fn frame_at(offset: usize) -> Result<Option<FrameHandle>, StackUnavailable> {
    STACK
        .try_with(|stack| -> Result<Option<FrameHandle>, StackUnavailable> {
            let stack = stack.try_borrow().map_err(|_| StackUnavailable)?;
            if offset >= stack.len() {
                return Ok(None);
            }
            let index = stack.len() - 1 - offset;
            Ok(Some(FrameHandle {
                thread: thread::current().id(),
                index,
                serial: stack[index].serial,
            }))
        })
        .map_err(|_| StackUnavailable)?
}

/// Copy out the data of a live frame
///
/// # Errors
/// * `FrameResolutionError::ForeignThread` - handle captured on another thread
/// * `FrameResolutionError::Stale` - the frame has returned
/// * `FrameResolutionError::Unavailable` - stack storage is inaccessible
pub fn snapshot(handle: FrameHandle) -> Result<FrameSnapshot, FrameResolutionError> {
    let current = thread::current().id();
    if handle.thread != current {
        return Err(FrameResolutionError::ForeignThread {
            owner: handle.thread,
            current,
        });
    }

    STACK
        .try_with(|stack| -> Result<FrameSnapshot, FrameResolutionError> {
            let stack = stack
                .try_borrow()
                .map_err(|_| FrameResolutionError::Unavailable)?;
            match stack.get(handle.index) {
                Some(record) if record.serial == handle.serial => Ok(FrameSnapshot {
                    file: record.file,
                    module_path: record.module_path,
                    path: record.path,
                    receiver: record.receiver,
                    line: record.line.get(),
                }),
                _ => Err(FrameResolutionError::Stale {
                    index: handle.index,
                    serial: handle.serial,
                }),
            }
        })
        .map_err(|_| FrameResolutionError::Unavailable)?
}

/// Short module name for a source path: no directories, no extension
///
/// `src/shapes/gear.rs` becomes `gear`.
pub fn module_name(file: &str) -> &str {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file)
}

/// Enter a frame for the enclosing function.
///
/// ```ignore
/// let _frame = enter!("free_function");
/// let _frame = enter!("Gear.mesh", recv = self);
/// let _frame = enter!("Gear.catalog", cls = Self);
/// ```
#[macro_export]
macro_rules! enter {
    ($path:expr) => {
        $crate::stack::enter(
            file!(),
            module_path!(),
            $path,
            line!(),
            $crate::stack::Receiver::None,
        )
    };
    ($path:expr, recv = $receiver:expr) => {
        $crate::stack::enter(
            file!(),
            module_path!(),
            $path,
            line!(),
            $crate::stack::Receiver::of($receiver),
        )
    };
    ($path:expr, cls = $ty:ty) => {
        $crate::stack::enter(
            file!(),
            module_path!(),
            $path,
            line!(),
            $crate::stack::Receiver::of_type::<$ty>(),
        )
    };
}

/// Record the current line on the innermost frame.
#[macro_export]
macro_rules! checkpoint {
    () => {
        $crate::stack::checkpoint(line!())
    };
}
