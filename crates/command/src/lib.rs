//! Command construction for groundwork
//!
//! A [`Command`] is a unit of remote work. Every variant renders the shell
//! text executed on the target and a human log line. The checksum of a
//! command is the fingerprint of its rendered shell text, so user wrapping
//! changes the checksum while log formatting does not.
//!
//! Only [`ShellCommand`]s can be wrapped to run as another user or combined
//! with [`and`] / [`or`]; other variants are rejected when the command is
//! built, never later at execution time.

pub mod download;
pub mod file;
pub mod quote;
pub mod shell;

pub use download::{download_and_extract, download_to_file, extract_file, DownloadCommand};
pub use file::{write_file, FileCommand};
pub use quote::quote;
pub use shell::{
    and, as_user, install_packages, mkdir, or, unless, update_packages, when, ShellCommand,
};

use groundwork_core::Checksum;

/// Rendering capability shared by all command variants
pub trait Render {
    /// Text executed in a shell on the target
    fn shell(&self) -> String;

    /// Line used for logging and progress events
    fn logging(&self) -> String;
}

/// The closed set of command variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Shell(ShellCommand),
    File(FileCommand),
    Download(DownloadCommand),
}

impl Command {
    /// Content fingerprint of the rendered shell text
    pub fn checksum(&self) -> Checksum {
        Checksum::of(&self.shell())
    }

    /// User the command is wrapped to run as, if any
    pub fn user(&self) -> Option<&str> {
        match self {
            Command::Shell(sc) => sc.user(),
            _ => None,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Command::Shell(_) => "shell",
            Command::File(_) => "file",
            Command::Download(_) => "download",
        }
    }
}

impl Render for Command {
    fn shell(&self) -> String {
        match self {
            Command::Shell(c) => c.shell(),
            Command::File(c) => c.shell(),
            Command::Download(c) => c.shell(),
        }
    }

    fn logging(&self) -> String {
        match self {
            Command::Shell(c) => c.logging(),
            Command::File(c) => c.logging(),
            Command::Download(c) => c.logging(),
        }
    }
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Command::Shell(ShellCommand::new(command))
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Command::Shell(ShellCommand::new(command))
    }
}

impl From<ShellCommand> for Command {
    fn from(command: ShellCommand) -> Self {
        Command::Shell(command)
    }
}

impl From<FileCommand> for Command {
    fn from(command: FileCommand) -> Self {
        Command::File(command)
    }
}

impl From<DownloadCommand> for Command {
    fn from(command: DownloadCommand) -> Self {
        Command::Download(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_follows_shell_text() {
        let plain = Command::from("systemctl restart nginx");
        let same = Command::from(String::from("systemctl restart nginx"));
        assert_eq!(plain.checksum(), same.checksum());

        let wrapped = as_user("www", "systemctl restart nginx").unwrap();
        assert_ne!(plain.checksum(), wrapped.checksum());
    }

    #[test]
    fn test_user_accessor() {
        assert_eq!(Command::from("id").user(), None);
        assert_eq!(as_user("deploy", "id").unwrap().user(), Some("deploy"));
    }
}
