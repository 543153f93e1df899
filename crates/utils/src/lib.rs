//! Shared utilities for groundwork

pub mod tracing;

pub use self::tracing::*;
