//! Compiled tasks

use groundwork_command::{Command, Render};
use groundwork_core::{Checksum, Error, Result};

/// A command frozen at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommand {
    pub checksum: Checksum,
    /// Text executed on the target
    pub shell: String,
    /// Text used in logs and events
    pub log: String,
}

impl From<&Command> for TaskCommand {
    fn from(command: &Command) -> Self {
        let shell = command.shell();
        Self {
            checksum: Checksum::of(&shell),
            shell,
            log: command.logging(),
        }
    }
}

/// A named, ordered and immutable list of commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    commands: Vec<TaskCommand>,
}

impl Task {
    pub fn new(name: impl Into<String>, commands: &[Command]) -> Result<Self> {
        let name = name.into();
        validate_task_name(&name)?;
        Ok(Self {
            name,
            commands: commands.iter().map(TaskCommand::from).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[TaskCommand] {
        &self.commands
    }

    pub fn checksums(&self) -> Vec<Checksum> {
        self.commands.iter().map(|c| c.checksum.clone()).collect()
    }
}

/// Task names double as cache directory names on the target
pub fn validate_task_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::package(name, "task name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(Error::package(name, "task name cannot be a relative path"));
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(Error::package(
            name,
            "task name must not contain '/' or whitespace",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundwork_command::as_user;

    #[test]
    fn test_task_freezes_commands() {
        let commands = vec![
            Command::from("apt-get install -y nginx"),
            as_user("www", "touch /srv/ready").unwrap(),
        ];
        let task = Task::new("webserver", &commands).unwrap();

        assert_eq!(task.name(), "webserver");
        assert_eq!(task.commands().len(), 2);
        assert_eq!(task.commands()[0].checksum, commands[0].checksum());
        assert_eq!(task.commands()[1].shell, "su -l www -c 'touch /srv/ready'");
        assert_eq!(task.checksums()[1], commands[1].checksum());
    }

    #[test]
    fn test_invalid_task_names() {
        for name in ["", ".", "..", "a/b", "with space"] {
            assert!(validate_task_name(name).is_err(), "{name:?} accepted");
        }
        assert!(validate_task_name("app.dirs").is_ok());
    }
}
