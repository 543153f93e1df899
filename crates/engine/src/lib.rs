//! Build orchestration for groundwork
//!
//! A [`Build`] provisions compiled tasks on one target: it makes sure the
//! configured user can maintain the marker tree, reads the checksum tree
//! once, then walks tasks and commands strictly in order, skipping what is
//! already done, invalidating what went stale and executing the rest. The
//! first failure aborts the run. Re-running is the retry mechanism.

pub mod build;
pub mod settings;

pub use build::{provision, Build, RunSummary};
pub use settings::BuildSettings;
