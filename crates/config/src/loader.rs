//! Manifest loading with environment overrides

use crate::config::{Config, ManifestPackage, Target};
use crate::manifest::{CommandSpec, Manifest, PackageSpec};
use groundwork_cache::CacheLayout;
use groundwork_command::Command;
use groundwork_core::{
    Error, Result, ResultExt, DEFAULT_CACHE_ROOT, DEFAULT_GROUP, DEFAULT_SSH_PORT,
    GROUNDWORK_CACHE_ROOT_VAR, GROUNDWORK_DRY_RUN_VAR, GROUNDWORK_GROUP_VAR, GROUNDWORK_USER_VAR,
    SUPERUSER,
};
use groundwork_engine::BuildSettings;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Loads a manifest and resolves it into a [`Config`].
///
/// Precedence, lowest first: built-in defaults, manifest, `GROUNDWORK_*`
/// environment variables. Command line flags are applied by the caller.
pub struct ConfigLoader {
    path: PathBuf,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Loader reading overrides from the process environment
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::new_with_env(path, std::env::vars().collect())
    }

    /// Loader with an explicit environment
    pub fn new_with_env(path: impl Into<PathBuf>, env: HashMap<String, String>) -> Self {
        Self {
            path: path.into(),
            env,
        }
    }

    pub async fn load(self) -> Result<Config> {
        let source = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::file_system(&self.path, "read", e))?;
        self.resolve(&source)
    }

    /// Resolve manifest text as if it had been read from this loader's path
    pub fn resolve(&self, source: &str) -> Result<Config> {
        let manifest: Manifest = toml::from_str(source).map_err(|e| {
            Error::configuration(format!("{}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), packages = manifest.packages.len(), "Parsed manifest");

        let settings = self.settings(&manifest)?;
        let (hostname, target) = self.target(&manifest)?;
        let mut packages = Vec::with_capacity(manifest.packages.len());
        for spec in &manifest.packages {
            packages.push((spec.name.clone(), build_package(spec)?));
        }

        Ok(Config {
            source: self.path.clone(),
            hostname,
            target,
            settings,
            packages,
        })
    }

    fn var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn settings(&self, manifest: &Manifest) -> Result<BuildSettings> {
        let provision = &manifest.provision;

        let user = self
            .var(GROUNDWORK_USER_VAR)
            .map(str::to_string)
            .or_else(|| manifest.host.user.clone())
            .unwrap_or_else(|| SUPERUSER.to_string());
        let root = self
            .var(GROUNDWORK_CACHE_ROOT_VAR)
            .map(str::to_string)
            .or_else(|| provision.cache_root.clone())
            .unwrap_or_else(|| DEFAULT_CACHE_ROOT.to_string());
        let group = self
            .var(GROUNDWORK_GROUP_VAR)
            .map(str::to_string)
            .or_else(|| provision.group.clone())
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());
        let dry_run = match self.var(GROUNDWORK_DRY_RUN_VAR) {
            Some(value) => parse_bool(GROUNDWORK_DRY_RUN_VAR, value)?,
            None => provision.dry_run.unwrap_or(false),
        };

        let settings = BuildSettings {
            user,
            dry_run,
            env: provision.env.clone(),
            layout: CacheLayout::new(root, group),
        };
        settings
            .validate()
            .with_context(|| format!("invalid settings in {}", self.path.display()))?;
        Ok(settings)
    }

    fn target(&self, manifest: &Manifest) -> Result<(String, Target)> {
        let host = &manifest.host;
        if host.local {
            let hostname = host.hostname.clone().unwrap_or_else(|| "localhost".into());
            return Ok((hostname, Target::Local));
        }

        let address = host
            .address
            .clone()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::configuration("[host] needs an address unless local = true"))?;
        let identity_file = host
            .identity_file
            .as_deref()
            .map(expand_path)
            .transpose()?;

        Ok((
            host.hostname.clone().unwrap_or_else(|| address.clone()),
            Target::Ssh {
                address,
                port: host.port.unwrap_or(DEFAULT_SSH_PORT),
                identity_file,
                connect_timeout: host.connect_timeout,
            },
        ))
    }
}

fn build_package(spec: &PackageSpec) -> Result<ManifestPackage> {
    let mut tasks = Vec::with_capacity(spec.tasks.len());
    for task in &spec.tasks {
        tasks.push((task.name.clone(), build_commands(&spec.name, &task.commands)?));
    }
    Ok(ManifestPackage {
        commands: build_commands(&spec.name, &spec.commands)?,
        tasks,
    })
}

fn build_commands(package: &str, specs: &[CommandSpec]) -> Result<Vec<Command>> {
    specs
        .iter()
        .map(|spec| {
            spec.to_command()
                .map_err(|e| Error::package(package, e.to_string()))
        })
        .collect()
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|e| Error::configuration(format!("cannot expand {raw:?}: {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "{name} must be a boolean, got {value:?}"
        ))),
    }
}
