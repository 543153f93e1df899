//! Downloading (and optionally extracting) remote files

use crate::{quote, Command, Render, ShellCommand};
use groundwork_core::{Error, Result, SUPERUSER};

/// Staging directory for downloads on the target
pub const TMP_DOWNLOAD_DIR: &str = "/tmp/downloads";

/// Supported archive formats, detected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    TarGz,
    TarBz2,
    Tar,
    Zip,
}

impl ArchiveKind {
    fn detect(path: &str) -> Option<Self> {
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if path.ends_with(".tar.bz2") || path.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if path.ends_with(".tar") {
            Some(Self::Tar)
        } else if path.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    fn script(self, archive: &str, target_dir: &str) -> String {
        let (archive, target_dir) = (quote(archive), quote(target_dir));
        let unpack = match self {
            Self::TarGz => format!("tar xfz {archive} -C {target_dir}"),
            Self::TarBz2 => format!("tar xfj {archive} -C {target_dir}"),
            Self::Tar => format!("tar xf {archive} -C {target_dir}"),
            Self::Zip => format!("unzip -o -d {target_dir} {archive}"),
        };
        format!("mkdir -p {target_dir} && {unpack}")
    }
}

/// Fetch a URL onto the target.
///
/// Without a destination the file stays in [`TMP_DOWNLOAD_DIR`]. With
/// extraction the archive is unpacked into the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCommand {
    url: String,
    destination: Option<String>,
    owner: Option<String>,
    permissions: Option<u32>,
    extract: Option<ArchiveKind>,
}

impl DownloadCommand {
    pub fn url(&self) -> &str {
        &self.url
    }

    fn file_name(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.url)
    }
}

/// Download `url` and extract it into the `destination` directory
pub fn download_and_extract(url: &str, destination: &str) -> Result<Command> {
    validate(url, destination)?;
    let kind = ArchiveKind::detect(url)
        .ok_or_else(|| Error::command(format!("unsupported archive type for {url:?}")))?;

    Ok(Command::Download(DownloadCommand {
        url: url.to_string(),
        destination: Some(destination.to_string()),
        owner: None,
        permissions: None,
        extract: Some(kind),
    }))
}

/// Download `url` to `destination`, a file path or an existing directory
pub fn download_to_file(
    url: &str,
    destination: &str,
    owner: Option<&str>,
    permissions: Option<u32>,
) -> Result<Command> {
    validate(url, destination)?;

    Ok(Command::Download(DownloadCommand {
        url: url.to_string(),
        destination: Some(destination.to_string()),
        owner: owner
            .filter(|o| !o.is_empty() && *o != SUPERUSER)
            .map(str::to_string),
        permissions: permissions.filter(|p| *p != 0),
        extract: None,
    }))
}

/// Extract an archive already present on the target into `target_dir`
pub fn extract_file(archive: &str, target_dir: &str) -> Result<Command> {
    if archive.is_empty() {
        return Err(Error::command("empty archive path given"));
    }
    if target_dir.is_empty() {
        return Err(Error::command("no target directory given"));
    }
    let kind = ArchiveKind::detect(archive)
        .ok_or_else(|| Error::command(format!("unsupported archive type for {archive:?}")))?;

    Ok(Command::Shell(ShellCommand::new(kind.script(archive, target_dir))))
}

fn validate(url: &str, destination: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::command("empty url given"));
    }
    if destination.is_empty() {
        return Err(Error::command("no destination given"));
    }
    Ok(())
}

/// `{ [ -f d ] && op d; } || { [ -d d ] && [ -f d/f ] && op d/f; } || ...`
fn apply_to_target(op: &str, recursive_op: &str, destination: &str, file_name: &str) -> String {
    let dest = quote(destination);
    let inner = quote(&format!("{destination}/{file_name}"));
    let branches = [
        format!("{{ [ -f {dest} ] && {op} {dest}; }}"),
        format!("{{ [ -d {dest} ] && [ -f {inner} ] && {op} {inner}; }}"),
        format!("{{ [ -d {dest} ] && {recursive_op} {dest}; }}"),
        String::from("{ echo \"Couldn't determine target\" && exit 1; }"),
    ];
    format!("{{ {}; }}", branches.join(" || "))
}

impl Render for DownloadCommand {
    fn shell(&self) -> String {
        let file_name = self.file_name();
        let staged = format!("{TMP_DOWNLOAD_DIR}/{file_name}");

        let mut parts = vec![
            format!("mkdir -p {TMP_DOWNLOAD_DIR}"),
            format!("cd {TMP_DOWNLOAD_DIR}"),
            format!("curl -SsfLO {}", quote(&self.url)),
        ];

        let mut target = staged.clone();
        match (&self.extract, &self.destination) {
            (Some(kind), Some(dest)) => parts.push(kind.script(&staged, dest)),
            (None, Some(dest)) => {
                parts.push(format!("mv {} {}", quote(&staged), quote(dest)));
                target = dest.clone();
            }
            _ => {}
        }

        if let Some(owner) = &self.owner {
            parts.push(apply_to_target(
                &format!("chown {owner}"),
                &format!("chown -R {owner}"),
                &target,
                file_name,
            ));
        }
        if let Some(mode) = self.permissions {
            let chmod = format!("chmod {mode:o}");
            parts.push(apply_to_target(&chmod, &chmod, &target, file_name));
        }

        parts.join(" && ")
    }

    fn logging(&self) -> String {
        let mut line = String::from("[DWNLOAD]");
        if let Some(owner) = &self.owner {
            line.push_str(&format!("[CHOWN:{owner}]"));
        }
        if let Some(mode) = self.permissions {
            line.push_str(&format!("[CHMOD:{mode:04o}]"));
        }
        line.push_str(&format!(" >> downloading file {:?}", self.url));
        if self.extract.is_some() {
            line.push_str(" and extracting archive");
        }
        if let Some(dest) = &self.destination {
            line.push_str(&format!(" to {dest:?}"));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_download_to_file() {
        let cmd = download_to_file(
            "https://example.com/tool-1.0",
            "/usr/local/bin/tool",
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            cmd.shell(),
            "mkdir -p /tmp/downloads && cd /tmp/downloads && \
             curl -SsfLO https://example.com/tool-1.0 && \
             mv /tmp/downloads/tool-1.0 /usr/local/bin/tool"
        );
        assert_eq!(
            cmd.logging(),
            "[DWNLOAD] >> downloading file \"https://example.com/tool-1.0\" to \"/usr/local/bin/tool\""
        );
    }

    #[test]
    fn test_owner_and_permissions_branch_on_target() {
        let cmd = download_to_file(
            "https://example.com/tool",
            "/opt/bin",
            Some("deploy"),
            Some(0o755),
        )
        .unwrap();
        let shell = cmd.shell();
        assert!(shell.contains("{ [ -f /opt/bin ] && chown deploy /opt/bin; }"));
        assert!(shell.contains("[ -f /opt/bin/tool ] && chmod 755 /opt/bin/tool;"));
        assert!(cmd.logging().starts_with("[DWNLOAD][CHOWN:deploy][CHMOD:0755]"));
    }

    #[test]
    fn test_download_and_extract() {
        let cmd = download_and_extract("https://example.com/app.tar.gz", "/opt/app").unwrap();
        assert!(cmd
            .shell()
            .ends_with("mkdir -p /opt/app && tar xfz /tmp/downloads/app.tar.gz -C /opt/app"));
        assert!(cmd.logging().contains(" and extracting archive to \"/opt/app\""));
    }

    #[test]
    fn test_invalid_downloads() {
        assert!(download_to_file("", "/tmp", None, None).is_err());
        assert!(download_to_file("https://x/y", "", None, None).is_err());
        assert!(download_and_extract("https://example.com/app.rar", "/opt").is_err());
    }

    #[test]
    fn test_extract_file() {
        let cmd = extract_file("/tmp/a.zip", "/srv/a").unwrap();
        assert_eq!(cmd.shell(), "mkdir -p /srv/a && unzip -o -d /srv/a /tmp/a.zip");
        assert!(extract_file("/tmp/a.7z", "/srv/a").is_err());
    }
}
