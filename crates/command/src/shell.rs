//! Plain shell commands and the helpers that compose them

use crate::{quote, Command, Render};
use groundwork_core::{Error, Result, SUPERUSER};

/// A shell snippet, optionally executed as another user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    command: String,
    user: Option<String>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            user: None,
        }
    }

    /// The unwrapped command text
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn runs_as_other_user(&self) -> Option<&str> {
        self.user().filter(|u| *u != SUPERUSER)
    }
}

impl Render for ShellCommand {
    fn shell(&self) -> String {
        match self.runs_as_other_user() {
            Some(user) => format!("su -l {} -c {}", user, quote(&self.command)),
            None => self.command.clone(),
        }
    }

    fn logging(&self) -> String {
        match self.runs_as_other_user() {
            Some(user) => format!("[COMMAND][{}] # {}", user, self.command),
            None => format!("[COMMAND] # {}", self.command),
        }
    }
}

/// Run the command as the given user.
///
/// Only plain shell commands can be wrapped, and only once.
pub fn as_user(user: &str, command: impl Into<Command>) -> Result<Command> {
    if user.is_empty() {
        return Err(Error::command("empty user given to as_user"));
    }

    match command.into() {
        Command::Shell(sc) if sc.user.is_some() => {
            Err(Error::command("nesting as_user calls not supported"))
        }
        Command::Shell(sc) => Ok(Command::Shell(ShellCommand {
            command: sc.command,
            user: Some(user.to_string()),
        })),
        other => Err(unsupported(&other)),
    }
}

/// Combine commands so that each runs only if the previous one succeeded
pub fn and<I, C>(commands: I) -> Result<Command>
where
    I: IntoIterator<Item = C>,
    C: Into<Command>,
{
    combine(commands, "&&")
}

/// Combine commands so that each runs only if the previous one failed
pub fn or<I, C>(commands: I) -> Result<Command>
where
    I: IntoIterator<Item = C>,
    C: Into<Command>,
{
    combine(commands, "||")
}

fn combine<I, C>(commands: I, operator: &str) -> Result<Command>
where
    I: IntoIterator<Item = C>,
    C: Into<Command>,
{
    let parts = commands
        .into_iter()
        .map(|c| plain_shell(c.into()))
        .collect::<Result<Vec<_>>>()?;

    let text = match parts.as_slice() {
        [] => return Err(Error::command("no commands given to combine")),
        [single] => single.clone(),
        many => format!("{{ {}; }}", many.join(&format!(" {operator} "))),
    };

    Ok(Command::Shell(ShellCommand::new(text)))
}

/// Run `command` only if `test` (a `[ ... ]` expression body) holds
pub fn when(test: &str, command: impl Into<Command>) -> Result<Command> {
    conditional(test, command.into(), "&&")
}

/// Run `command` only if `test` does not hold
pub fn unless(test: &str, command: impl Into<Command>) -> Result<Command> {
    conditional(test, command.into(), "||")
}

fn conditional(test: &str, command: Command, operator: &str) -> Result<Command> {
    if test.trim().is_empty() {
        return Err(Error::command("empty test given"));
    }

    let text = plain_shell(command)?;
    if text.trim().is_empty() {
        return Err(Error::command("empty command given"));
    }

    Ok(Command::Shell(ShellCommand::new(format!(
        "{{ [ {test} ] {operator} {text}; }}"
    ))))
}

/// Create a directory with optional owner and mode
pub fn mkdir(path: &str, owner: Option<&str>, mode: Option<u32>) -> Result<Command> {
    if path.is_empty() {
        return Err(Error::command("empty path given to mkdir"));
    }

    let path = quote(path);
    let mut parts = vec![format!("mkdir -p {path}")];
    if let Some(owner) = owner.filter(|o| !o.is_empty()) {
        parts.push(format!("chown {owner} {path}"));
    }
    if let Some(mode) = mode.filter(|m| *m != 0) {
        parts.push(format!("chmod {mode:o} {path}"));
    }

    Ok(Command::Shell(ShellCommand::new(parts.join(" && "))))
}

/// Install the given packages non-interactively
pub fn install_packages<I, S>(packages: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let packages: Vec<String> = packages
        .into_iter()
        .map(|p| quote(p.as_ref()))
        .collect();
    if packages.is_empty() {
        return Err(Error::command("no packages given to install"));
    }

    Ok(Command::Shell(ShellCommand::new(format!(
        "DEBIAN_FRONTEND=noninteractive apt-get install -y --no-install-recommends {}",
        packages.join(" ")
    ))))
}

/// Refresh the package index and upgrade installed packages
pub fn update_packages() -> Command {
    Command::Shell(ShellCommand::new(
        "DEBIAN_FRONTEND=noninteractive apt-get update && \
         DEBIAN_FRONTEND=noninteractive apt-get upgrade -y",
    ))
}

fn plain_shell(command: Command) -> Result<String> {
    match command {
        Command::Shell(sc) if sc.user.is_some() => {
            Err(Error::command("as_user not supported in nested commands"))
        }
        Command::Shell(sc) => Ok(sc.command),
        other => Err(unsupported(&other)),
    }
}

fn unsupported(command: &Command) -> Error {
    Error::command(format!(
        "command variant {:?} not supported",
        command.variant_name()
    ))
}
