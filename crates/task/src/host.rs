//! Host registration and one-time compilation

use crate::package::{CommandPackage, Package, PackageBuilder};
use crate::task::Task;
use groundwork_command::Command;
use groundwork_core::{Error, Result, RESERVED_TASK_PREFIX};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// A provisioning target and the packages registered for it
pub struct Host {
    hostname: String,
    system_packages: IndexMap<String, Box<dyn Package>>,
    user_packages: IndexMap<String, Box<dyn Package>>,
    compiled: bool,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("hostname", &self.hostname)
            .field("system_packages", &self.system_packages.keys())
            .field("user_packages", &self.user_packages.keys())
            .field("compiled", &self.compiled)
            .finish()
    }
}

impl Host {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            system_packages: IndexMap::new(),
            user_packages: IndexMap::new(),
            compiled: false,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Register a user package under `name`
    pub fn add_package(&mut self, name: &str, package: impl Package + 'static) -> Result<()> {
        if name.starts_with(RESERVED_TASK_PREFIX) {
            return Err(Error::package(
                name,
                format!("package name prefix {RESERVED_TASK_PREFIX:?} is reserved"),
            ));
        }
        self.ensure_unique(name)?;
        debug!(package = %name, "Registered package");
        self.user_packages.insert(name.to_string(), Box::new(package));
        Ok(())
    }

    /// Register a single-task package made of `commands`
    pub fn add_commands<I, C>(&mut self, name: &str, commands: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: Into<Command>,
    {
        self.add_package(name, CommandPackage::new(commands))
    }

    /// Register an internally managed package; the reserved prefix is added
    pub fn add_system_package(
        &mut self,
        name: &str,
        package: impl Package + 'static,
    ) -> Result<()> {
        let name = format!("{RESERVED_TASK_PREFIX}{name}");
        self.ensure_unique(&name)?;
        debug!(package = %name, "Registered system package");
        self.system_packages.insert(name, Box::new(package));
        Ok(())
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.system_packages.contains_key(name) || self.user_packages.contains_key(name) {
            return Err(Error::package(name, "package with this name exists already"));
        }
        Ok(())
    }

    /// Names of all registered packages, system packages first
    pub fn package_names(&self) -> Vec<&str> {
        self.system_packages
            .keys()
            .chain(self.user_packages.keys())
            .map(String::as_str)
            .collect()
    }

    /// Compile all packages into tasks. Allowed once per host.
    pub fn compile(&mut self) -> Result<Vec<Task>> {
        if self.compiled {
            return Err(Error::package(
                &self.hostname,
                "packages of this host were compiled already",
            ));
        }
        self.compiled = true;

        let mut tasks = Vec::new();
        let mut seen = HashSet::new();
        let packages = self
            .system_packages
            .iter()
            .map(|p| (p, true))
            .chain(self.user_packages.iter().map(|p| (p, false)));
        for ((name, package), system) in packages {
            let mut builder = PackageBuilder::new(name.clone());
            package.build(&mut builder)?;
            for task in builder.into_tasks() {
                if !system && task.name().starts_with(RESERVED_TASK_PREFIX) {
                    return Err(Error::package(
                        name,
                        format!(
                            "task {:?} uses the reserved prefix {RESERVED_TASK_PREFIX:?}",
                            task.name()
                        ),
                    ));
                }
                if !seen.insert(task.name().to_string()) {
                    return Err(Error::package(
                        name,
                        format!("task {:?} clashes with another package", task.name()),
                    ));
                }
                tasks.push(task);
            }
        }

        debug!(
            hostname = %self.hostname,
            task_count = tasks.len(),
            "Compiled host packages"
        );
        Ok(tasks)
    }
}
