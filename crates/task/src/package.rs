//! Package declarations and compilation into tasks

use crate::task::Task;
use groundwork_command::Command;
use groundwork_core::{Error, Result};

/// A declarative bundle of tasks.
///
/// `build` is called exactly once, when the owning host is compiled.
pub trait Package: Send + Sync {
    fn build(&self, builder: &mut PackageBuilder) -> Result<()>;
}

impl<F> Package for F
where
    F: Fn(&mut PackageBuilder) -> Result<()> + Send + Sync,
{
    fn build(&self, builder: &mut PackageBuilder) -> Result<()> {
        self(builder)
    }
}

/// Collects the tasks of one package.
///
/// The package's main task is named after the package; further tasks are
/// named `<package>.<task>`.
#[derive(Debug)]
pub struct PackageBuilder {
    name: String,
    tasks: Vec<Task>,
}

impl PackageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add the package's main task
    pub fn commands(&mut self, commands: &[Command]) -> Result<&mut Self> {
        let name = self.name.clone();
        self.push(name, commands)
    }

    /// Add a named sub task
    pub fn task(&mut self, name: &str, commands: &[Command]) -> Result<&mut Self> {
        if name.is_empty() {
            return Err(Error::package(&self.name, "sub task name cannot be empty"));
        }
        let name = format!("{}.{}", self.name, name);
        self.push(name, commands)
    }

    fn push(&mut self, name: String, commands: &[Command]) -> Result<&mut Self> {
        if self.tasks.iter().any(|t| t.name() == name) {
            return Err(Error::package(
                &self.name,
                format!("task {name:?} defined twice"),
            ));
        }
        self.tasks.push(Task::new(name, commands)?);
        Ok(self)
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}

/// A package made of a single task
#[derive(Debug, Clone, Default)]
pub struct CommandPackage {
    commands: Vec<Command>,
}

impl CommandPackage {
    pub fn new<I, C>(commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Command>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }
}

impl Package for CommandPackage {
    fn build(&self, builder: &mut PackageBuilder) -> Result<()> {
        builder.commands(&self.commands)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_package_builds_one_task() {
        let pkg = CommandPackage::new(["echo one", "echo two"]);
        let mut builder = PackageBuilder::new("hello");
        pkg.build(&mut builder).unwrap();

        let tasks = builder.into_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name(), "hello");
        assert_eq!(tasks[0].commands()[1].shell, "echo two");
    }

    #[test]
    fn test_closure_package_with_sub_tasks() {
        let pkg = |b: &mut PackageBuilder| -> Result<()> {
            b.task("dirs", &[Command::from("mkdir -p /srv/app")])?
                .task("config", &[Command::from("touch /srv/app/config")])?;
            Ok(())
        };
        let mut builder = PackageBuilder::new("app");
        pkg.build(&mut builder).unwrap();

        let names: Vec<_> = builder
            .into_tasks()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["app.dirs", "app.config"]);
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut builder = PackageBuilder::new("app");
        builder.task("x", &[]).unwrap();
        let err = builder.task("x", &[]).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }
}
