//! On-disk manifest format

use groundwork_command::{
    as_user, download_and_extract, download_to_file, install_packages, mkdir, update_packages,
    write_file, Command,
};
use groundwork_core::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;

/// Top level of a manifest file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub host: HostSection,
    #[serde(default)]
    pub provision: ProvisionSection,
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    pub address: Option<String>,
    pub user: Option<String>,
    /// Name used in events; defaults to the address
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<String>,
    pub connect_timeout: Option<u64>,
    /// Provision this machine instead of connecting over ssh
    #[serde(default)]
    pub local: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionSection {
    pub cache_root: Option<String>,
    pub group: Option<String>,
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSpec {
    pub name: String,
    /// The package's main task
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub name: String,
    pub commands: Vec<CommandSpec>,
}

/// One command entry; the variant is picked by its keys.
///
/// Every table form rejects unknown keys, so a misspelled key is an error
/// instead of a silently different command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Plain(String),
    Run(RunSpec),
    Install(InstallSpec),
    UpdatePackages(UpdatePackagesSpec),
    Mkdir(MkdirSpec),
    File(FileSpec),
    Download(DownloadSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSpec {
    pub run: String,
    pub as_user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallSpec {
    pub install: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePackagesSpec {
    pub update_packages: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MkdirSpec {
    pub mkdir: String,
    pub owner: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSpec {
    pub file: String,
    pub content: String,
    pub owner: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadSpec {
    pub download: String,
    pub destination: String,
    #[serde(default)]
    pub extract: bool,
    pub owner: Option<String>,
    pub mode: Option<String>,
}

impl CommandSpec {
    pub fn to_command(&self) -> Result<Command> {
        match self {
            CommandSpec::Plain(run) => Ok(Command::from(run.as_str())),
            CommandSpec::Run(RunSpec { run, as_user: None }) => Ok(Command::from(run.as_str())),
            CommandSpec::Run(RunSpec {
                run,
                as_user: Some(user),
            }) => as_user(user, run.as_str()),
            CommandSpec::Install(spec) => install_packages(&spec.install),
            CommandSpec::UpdatePackages(spec) if spec.update_packages => Ok(update_packages()),
            CommandSpec::UpdatePackages(_) => Err(Error::configuration(
                "update_packages = false is not a command",
            )),
            CommandSpec::Mkdir(spec) => mkdir(
                &spec.mkdir,
                spec.owner.as_deref(),
                parse_mode(spec.mode.as_deref())?,
            ),
            CommandSpec::File(spec) => write_file(
                &spec.file,
                &spec.content,
                spec.owner.as_deref(),
                parse_mode(spec.mode.as_deref())?,
            ),
            CommandSpec::Download(spec) => spec.to_command(),
        }
    }
}

impl DownloadSpec {
    fn to_command(&self) -> Result<Command> {
        if !self.extract {
            return download_to_file(
                &self.download,
                &self.destination,
                self.owner.as_deref(),
                parse_mode(self.mode.as_deref())?,
            );
        }
        if self.owner.is_some() || self.mode.is_some() {
            return Err(Error::configuration(
                "owner and mode cannot be combined with extract",
            ));
        }
        download_and_extract(&self.download, &self.destination)
    }
}

/// Parse an octal mode such as `"0755"` or `"2775"`
pub fn parse_mode(mode: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = mode else {
        return Ok(None);
    };
    let digits = raw.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|m| *m <= 0o7777)
        .map(Some)
        .ok_or_else(|| Error::configuration(format!("invalid file mode {raw:?}")))
}
