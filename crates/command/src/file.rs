//! Writing files on the target

use crate::{quote, Command, Render};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use groundwork_core::{Error, Result, SUPERUSER};

/// Write `content` to `path`, transferring it base64 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommand {
    path: String,
    content: String,
    owner: Option<String>,
    mode: Option<u32>,
}

impl FileCommand {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Build a command writing `content` to `path` with optional owner and mode
pub fn write_file(
    path: &str,
    content: &str,
    owner: Option<&str>,
    mode: Option<u32>,
) -> Result<Command> {
    if path.is_empty() {
        return Err(Error::command("empty path given to write_file"));
    }

    Ok(Command::File(FileCommand {
        path: path.to_string(),
        content: content.to_string(),
        owner: owner
            .filter(|o| !o.is_empty() && *o != SUPERUSER)
            .map(str::to_string),
        mode: mode.filter(|m| *m != 0),
    }))
}

impl Render for FileCommand {
    fn shell(&self) -> String {
        let path = quote(&self.path);
        let mut parts = vec![format!(
            "echo '{}' | base64 -d > {path}",
            STANDARD.encode(self.content.as_bytes())
        )];
        if let Some(owner) = &self.owner {
            parts.push(format!("chown {owner} {path}"));
        }
        if let Some(mode) = self.mode {
            parts.push(format!("chmod {mode:o} {path}"));
        }
        parts.join(" && ")
    }

    fn logging(&self) -> String {
        let mut line = String::from("[FILE   ]");
        if let Some(owner) = &self.owner {
            line.push_str(&format!("[CHOWN:{owner}]"));
        }
        if let Some(mode) = self.mode {
            line.push_str(&format!("[CHMOD:{mode:04o}]"));
        }
        line.push_str(&format!(" >> writing file {:?}", self.path));
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_is_base64_encoded() {
        let cmd = write_file("/etc/motd", "hello 'world'\n", None, None).unwrap();
        assert_eq!(
            cmd.shell(),
            "echo 'aGVsbG8gJ3dvcmxkJwo=' | base64 -d > /etc/motd"
        );
        assert_eq!(cmd.logging(), "[FILE   ] >> writing file \"/etc/motd\"");
    }

    #[test]
    fn test_owner_and_mode() {
        let cmd = write_file("/srv/app.conf", "x", Some("www-data"), Some(0o640)).unwrap();
        let shell = cmd.shell();
        assert!(shell.ends_with("&& chown www-data /srv/app.conf && chmod 640 /srv/app.conf"));
        assert!(cmd.logging().starts_with("[FILE   ][CHOWN:www-data][CHMOD:0640]"));
    }

    #[test]
    fn test_root_owner_is_dropped() {
        let cmd = write_file("/tmp/x", "x", Some("root"), None).unwrap();
        assert!(!cmd.shell().contains("chown"));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(write_file("", "x", None, None).is_err());
    }
}
