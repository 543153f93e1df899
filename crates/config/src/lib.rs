//! Provisioning manifest loading for groundwork
//!
//! A TOML manifest names the target, the provisioning settings and the
//! packages to apply. [`ConfigLoader`] reads it, layers `GROUNDWORK_*`
//! environment overrides on top and produces an immutable [`Config`] that
//! can hand out a [`groundwork_task::Host`], the build settings and a
//! transport.

pub mod config;
pub mod loader;
pub mod manifest;

pub use config::{Config, ManifestPackage, Target};
pub use loader::ConfigLoader;
pub use manifest::{CommandSpec, Manifest};
