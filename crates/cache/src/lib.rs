//! Remote cache state for groundwork
//!
//! The target keeps one directory per task below the cache root. Each
//! successfully executed command leaves a `<checksum>.done` marker there.
//! This crate renders the scripts that read and maintain those markers
//! ([`CacheLayout`]), turns a marker listing into a [`ChecksumTree`] and
//! decides per task which commands are cached, which run, and which markers
//! go stale ([`plan_task`]).
//!
//! Nothing here talks to the target; the engine ships the rendered scripts
//! through a transport.

pub mod layout;
pub mod plan;
pub mod tree;

pub use layout::CacheLayout;
pub use plan::{plan_task, Step, TaskPlan, WorkingSet};
pub use tree::ChecksumTree;
