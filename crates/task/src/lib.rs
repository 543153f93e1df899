//! Tasks, packages and hosts for groundwork
//!
//! Packages are declarative descriptions registered on a [`Host`] under a
//! unique name. Compiling the host turns every package into an ordered list
//! of immutable [`Task`]s: system packages first, then user packages in
//! registration order.

pub mod host;
pub mod package;
pub mod task;

pub use host::Host;
pub use package::{CommandPackage, Package, PackageBuilder};
pub use task::{validate_task_name, Task, TaskCommand};
