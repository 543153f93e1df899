//! Scripts for reading and maintaining completion markers

use groundwork_command::quote;
use groundwork_core::{
    Checksum, CACHE_DIR_MODE, DEFAULT_CACHE_ROOT, DEFAULT_GROUP, DONE_SUFFIX, FAILED_SUFFIX,
};
use serde::{Deserialize, Serialize};

const GROUP_FILE: &str = "/etc/group";

/// Location of the marker tree on the target and the group sharing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLayout {
    root: String,
    group: String,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ROOT, DEFAULT_GROUP)
    }
}

impl CacheLayout {
    pub fn new(root: impl Into<String>, group: impl Into<String>) -> Self {
        let root = root.into();
        let root = match root.trim_end_matches('/') {
            "" if root.starts_with('/') => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            root,
            group: group.into(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Directory holding the markers of `task`
    pub fn task_dir(&self, task: &str) -> String {
        if self.root == "/" {
            format!("/{task}")
        } else {
            format!("{}/{task}", self.root)
        }
    }

    pub fn done_marker(&self, task: &str, checksum: &Checksum) -> String {
        format!("{}/{checksum}{DONE_SUFFIX}", self.task_dir(task))
    }

    /// Read-only listing of every completion marker; prints nothing if the
    /// root is missing
    pub fn listing_query(&self) -> String {
        let root = quote(&self.root);
        format!("if [ -d {root} ]; then find {root} -type f -name '*{DONE_SUFFIX}'; fi")
    }

    pub fn create_task_dir(&self, task: &str) -> String {
        format!("mkdir -m {CACHE_DIR_MODE} -p {}", quote(&self.task_dir(task)))
    }

    pub fn mark_done(&self, task: &str, checksum: &Checksum) -> String {
        format!("touch {}", quote(&self.done_marker(task, checksum)))
    }

    pub fn mark_failed(&self, task: &str, checksum: &Checksum) -> String {
        format!(
            "touch {}",
            quote(&format!("{}/{checksum}{FAILED_SUFFIX}", self.task_dir(task)))
        )
    }

    /// Remove the given markers of `task` together with any failure markers
    pub fn cleanup(&self, task: &str, checksums: &[Checksum]) -> String {
        let mut markers: Vec<String> = checksums
            .iter()
            .map(|c| format!("{c}{DONE_SUFFIX}"))
            .collect();
        markers.sort();
        format!(
            "cd {} && rm -f *{FAILED_SUFFIX} {}",
            quote(&self.task_dir(task)),
            markers.join(" ")
        )
    }

    /// Succeeds iff `user` is listed in the group and the cache root exists
    pub fn bootstrap_check(&self, user: &str) -> String {
        format!(
            "awk -F: -v {group} -v {user} \
             '$1 == g {{ n = split($4, m, \",\"); for (i = 1; i <= n; i++) if (m[i] == u) f = 1 }} END {{ exit !f }}' \
             {GROUP_FILE} && [ -d {root} ]",
            group = quote(&format!("g={}", self.group)),
            user = quote(&format!("u={user}")),
            root = quote(&self.root),
        )
    }

    /// Idempotently create the group and the cache root and add `user` to
    /// the group
    pub fn bootstrap_setup(&self, user: &str) -> String {
        let group = quote(&self.group);
        let root = quote(&self.root);
        format!(
            "{{ awk -F: -v {group_var} '$1 == g {{ f = 1 }} END {{ exit !f }}' {GROUP_FILE} || groupadd {group}; }} && \
             {{ [ -d {root} ] || {{ mkdir -p -m {CACHE_DIR_MODE} {root} && chgrp {group} {root}; }}; }} && \
             usermod -a -G {group} {user}",
            group_var = quote(&format!("g={}", self.group)),
            user = quote(user),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checksum(seed: &str) -> Checksum {
        Checksum::of(seed)
    }

    #[test]
    fn test_root_is_normalised() {
        assert_eq!(CacheLayout::new("/var/cache/gw/", "gw").root(), "/var/cache/gw");
        assert_eq!(CacheLayout::new("/", "gw").task_dir("a"), "/a");
        assert_eq!(CacheLayout::default().task_dir("webserver"), "/var/lib/groundwork/webserver");
    }

    #[test]
    fn test_listing_query() {
        let layout = CacheLayout::new("/var/lib/groundwork", "groundwork");
        assert_eq!(
            layout.listing_query(),
            "if [ -d /var/lib/groundwork ]; then find /var/lib/groundwork -type f -name '*.done'; fi"
        );
    }

    #[test]
    fn test_task_dir_gets_setgid_mode() {
        let layout = CacheLayout::default();
        assert_eq!(
            layout.create_task_dir("webserver"),
            "mkdir -m 2775 -p /var/lib/groundwork/webserver"
        );
    }

    #[test]
    fn test_markers() {
        let layout = CacheLayout::default();
        let c = checksum("true");
        assert_eq!(
            layout.mark_done("webserver", &c),
            format!("touch /var/lib/groundwork/webserver/{c}.done")
        );
        assert_eq!(
            layout.mark_failed("webserver", &c),
            format!("touch /var/lib/groundwork/webserver/{c}.failed")
        );
    }

    #[test]
    fn test_cleanup_is_sorted_and_removes_failures() {
        let layout = CacheLayout::default();
        let mut stale = vec![checksum("b"), checksum("a")];
        let script = layout.cleanup("webserver", &stale);
        stale.sort();
        assert_eq!(
            script,
            format!(
                "cd /var/lib/groundwork/webserver && rm -f *.failed {}.done {}.done",
                stale[0], stale[1]
            )
        );
    }

    #[test]
    fn test_bootstrap_scripts() {
        let layout = CacheLayout::default();
        assert_eq!(
            layout.bootstrap_check("deploy"),
            "awk -F: -v g=groundwork -v u=deploy \
             '$1 == g { n = split($4, m, \",\"); for (i = 1; i <= n; i++) if (m[i] == u) f = 1 } END { exit !f }' \
             /etc/group && [ -d /var/lib/groundwork ]"
        );
        let setup = layout.bootstrap_setup("deploy");
        assert!(setup.starts_with(
            "{ awk -F: -v g=groundwork '$1 == g { f = 1 } END { exit !f }' /etc/group || groupadd groundwork; }"
        ));
        assert!(setup.contains(
            "{ [ -d /var/lib/groundwork ] || { mkdir -p -m 2775 /var/lib/groundwork && chgrp groundwork /var/lib/groundwork; }; }"
        ));
        assert!(setup.ends_with("usermod -a -G groundwork deploy"));
    }

    #[test]
    fn test_bootstrap_quotes_group_and_user() {
        let layout = CacheLayout::new("/var/lib/groundwork", "ops team");
        assert!(layout
            .bootstrap_check("de$ploy")
            .starts_with("awk -F: -v 'g=ops team' -v 'u=de$ploy' "));
        assert!(layout
            .bootstrap_setup("deploy")
            .contains("-v 'g=ops team' '$1 == g { f = 1 } END { exit !f }' /etc/group || groupadd 'ops team';"));
    }

    /// Run the membership check against a scratch group file
    fn member(group: &str, user: &str, group_file: &str) -> bool {
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("group");
        std::fs::write(&groups, group_file).unwrap();
        let layout = CacheLayout::new(dir.path().to_str().unwrap(), group);
        let script = layout
            .bootstrap_check(user)
            .replace(GROUP_FILE, groups.to_str().unwrap());
        std::process::Command::new("sh")
            .arg("-c")
            .arg(script)
            .status()
            .unwrap()
            .success()
    }

    #[test]
    fn test_bootstrap_check_matches_members_exactly() {
        let file = "wheel:x:10:root\ngroundwork:x:990:deployer,ops-deploy,admin\n";
        assert!(member("groundwork", "admin", file));
        assert!(member("groundwork", "deployer", file));
        assert!(!member("groundwork", "deploy", file));
        assert!(!member("groundwork", "ops", file));
        assert!(!member("wheel", "admin", file));
    }

    #[test]
    fn test_bootstrap_check_matches_group_name_literally() {
        let file = "groundXwork:x:990:deploy\n";
        assert!(!member("ground.work", "deploy", file));
        assert!(!member("ground", "deploy", file));
        assert!(member("groundXwork", "deploy", file));
    }
}
