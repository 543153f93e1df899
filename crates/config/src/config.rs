//! Resolved configuration
//!
//! `Config` is immutable once loaded. Packages are kept as already
//! validated commands so that building a [`Host`] cannot fail on command
//! construction, only on registration rules.

use groundwork_command::Command;
use groundwork_core::Result;
use groundwork_engine::BuildSettings;
use groundwork_task::{Host, Package, PackageBuilder};
use groundwork_transport::{LocalTransport, SshTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;

/// Where scripts are executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local,
    Ssh {
        address: String,
        port: u16,
        identity_file: Option<PathBuf>,
        connect_timeout: Option<u64>,
    },
}

/// A manifest package with its commands already constructed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPackage {
    pub commands: Vec<Command>,
    pub tasks: Vec<(String, Vec<Command>)>,
}

impl Package for ManifestPackage {
    fn build(&self, builder: &mut PackageBuilder) -> Result<()> {
        if !self.commands.is_empty() || self.tasks.is_empty() {
            builder.commands(&self.commands)?;
        }
        for (name, commands) in &self.tasks {
            builder.task(name, commands)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Manifest the configuration was read from
    pub source: PathBuf,
    /// Name of the target in events and logs
    pub hostname: String,
    pub target: Target,
    pub settings: BuildSettings,
    pub packages: Vec<(String, ManifestPackage)>,
}

impl Config {
    /// A fresh host with every manifest package registered, in manifest order
    pub fn host(&self) -> Result<Host> {
        let mut host = Host::new(&self.hostname);
        for (name, package) in &self.packages {
            host.add_package(name, package.clone())?;
        }
        Ok(host)
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        match &self.target {
            Target::Local => Arc::new(LocalTransport::new()),
            Target::Ssh {
                address,
                port,
                identity_file,
                connect_timeout,
            } => {
                let mut ssh = SshTransport::new(address, &self.settings.user).with_port(*port);
                if let Some(path) = identity_file {
                    ssh = ssh.with_identity_file(path);
                }
                if let Some(seconds) = connect_timeout {
                    ssh = ssh.with_connect_timeout(*seconds);
                }
                Arc::new(ssh)
            }
        }
    }
}
