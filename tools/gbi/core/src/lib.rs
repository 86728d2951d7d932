#![cfg_attr(not(test), no_std)]
#![allow(clippy::single_match)]
extern crate alloc;

pub mod gbi;
pub mod segments;
pub mod memory;
pub mod call_stack;
pub mod backend;
pub mod dispatch;
pub mod interpreter;
pub mod recorder;
pub mod error;

pub use backend::Backend;
pub use error::{InterpretError, OutOfRange};
pub use gbi::{Command, DisplayListBuilder, COMMAND_SIZE};
pub use interpreter::{BadPointerPolicy, FrameStats, Interpreter, InterpreterConfig};
pub use memory::{Memory, Rdram};
pub use recorder::{BackendCall, RecordingBackend};
pub use segments::SegmentTable;
