//! Per-run settings resolved before a build starts

use groundwork_cache::CacheLayout;
use groundwork_command::quote;
use groundwork_core::{Error, Result, SUPERUSER};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Account scripts run as on the target
    pub user: String,
    /// Publish intent events instead of changing the target
    pub dry_run: bool,
    /// Exported in front of every task command; not part of checksums
    pub env: IndexMap<String, String>,
    pub layout: CacheLayout,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            user: SUPERUSER.to_string(),
            dry_run: false,
            env: IndexMap::new(),
            layout: CacheLayout::default(),
        }
    }
}

impl BuildSettings {
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(Error::precondition("no user configured for provisioning"));
        }
        for key in self.env.keys() {
            let valid = key
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(Error::configuration(format!(
                    "invalid environment variable name {key:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn requires_sudo(&self) -> bool {
        self.user != SUPERUSER
    }

    /// Wrap `script` so it runs with root privileges for a non-root user
    pub fn privileged(&self, script: &str) -> String {
        if self.requires_sudo() {
            format!("sudo sh -c {}", quote(script))
        } else {
            script.to_string()
        }
    }

    /// Prefix `script` with the configured environment exports
    pub fn with_env(&self, script: &str) -> String {
        if self.env.is_empty() {
            return script.to_string();
        }
        let exports: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("export {k}={}", quote(v)))
            .collect();
        format!("{} && {script}", exports.join(" && "))
    }
}
