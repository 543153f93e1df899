//! Core domain types, errors, and constants for `groundwork`.
//!
//! This crate holds the building blocks shared by every other crate in the
//! workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias covering every failure
//!   a provisioning run can hit, from bootstrap preconditions to stale marker
//!   cleanup.
//! - **`types`**: domain newtypes such as `Checksum`, which enforces the
//!   64-character fingerprint invariant at the type level.
//! - **`events`**: progress events published during a run, the emitter and
//!   the subscribers that consume them.
//! - **`constants`**: default cache locations, marker suffixes and
//!   environment variable names.

pub mod constants;
pub mod errors;
pub mod events;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    events::{EventEmitter, EventKind, ExecStatus, Phase, ProvisionEvent},
    types::*,
};
