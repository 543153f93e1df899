//! Domain types shared across the workspace

pub mod checksum;

pub use checksum::Checksum;
