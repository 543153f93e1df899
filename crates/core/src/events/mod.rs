//! Progress events published while provisioning
//!
//! The engine publishes a `ProvisionEvent` around every task, every command
//! and every cache cleanup. Subscribers decide what to do with them: print to
//! the terminal, append to a JSON-lines file or keep them in memory.

pub mod console;
pub mod emitter;
pub mod json_log;
pub mod memory;
pub mod subscriber;
pub mod types;

pub use console::{ConsoleSubscriber, ConsoleVerbosity};
pub use emitter::EventEmitter;
pub use json_log::JsonLogSubscriber;
pub use memory::MemorySubscriber;
pub use subscriber::{EventSubscriber, PublishedEvent};
pub use types::{EventKind, ExecStatus, Phase, ProvisionEvent};
