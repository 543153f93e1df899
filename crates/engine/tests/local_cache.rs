//! End-to-end runs against a real marker tree on the local machine

use groundwork_cache::CacheLayout;
use groundwork_command::Command;
use groundwork_core::{Checksum, Error};
use groundwork_engine::{Build, BuildSettings, RunSummary};
use groundwork_task::Task;
use groundwork_transport::LocalTransport;
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    root: PathBuf,
    work: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");
        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        Self {
            dir,
            root,
            work,
        }
    }

    fn build(&self, dry_run: bool) -> Build {
        let settings = BuildSettings {
            user: "root".into(),
            dry_run,
            layout: CacheLayout::new(self.root.display().to_string(), "groundwork"),
            ..BuildSettings::default()
        };
        Build::new("localhost", Arc::new(LocalTransport::new()), settings)
    }

    /// A command appending `line` to the work log
    fn step(&self, line: &str) -> Command {
        Command::from(format!(
            "echo {line} >> {}",
            self.work.join("log").display()
        ))
    }

    fn log(&self) -> Vec<String> {
        fs::read_to_string(self.work.join("log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn markers(&self, task: &str) -> BTreeSet<String> {
        let dir = self.root.join(task);
        match fs::read_dir(&dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => BTreeSet::new(),
        }
    }
}

fn done(commands: &[&Command]) -> BTreeSet<String> {
    commands
        .iter()
        .map(|c| format!("{}.done", c.checksum()))
        .collect()
}

fn task(name: &str, commands: &[Command]) -> Task {
    Task::new(name, commands).unwrap()
}

fn snapshot(path: &Path) -> Vec<(PathBuf, u64)> {
    let mut entries = Vec::new();
    if let Ok(read) = fs::read_dir(path) {
        for entry in read.flatten() {
            let p = entry.path();
            if p.is_dir() {
                entries.push((p.clone(), 0));
                entries.extend(snapshot(&p));
            } else {
                entries.push((p.clone(), entry.metadata().unwrap().len()));
            }
        }
    }
    entries.sort();
    entries
}

#[tokio::test]
async fn second_run_is_a_noop() {
    let fx = Fixture::new();
    let commands = vec![fx.step("a"), fx.step("b")];
    let tasks = vec![task("base", &commands)];

    let first = fx.build(false).run(&tasks).await.unwrap();
    assert_eq!(first.executed, 2);

    let second = fx.build(false).run(&tasks).await.unwrap();
    assert!(second.is_noop());
    assert_eq!(second.cached, 2);
    assert_eq!(fx.log(), vec!["a", "b"]);
    assert_eq!(fx.markers("base"), done(&[&commands[0], &commands[1]]));
}

#[tokio::test]
async fn fresh_task_directory_is_setgid() {
    let fx = Fixture::new();
    fx.build(false)
        .run(&[task("fresh", &[fx.step("x")])])
        .await
        .unwrap();

    let mode = fs::metadata(fx.root.join("fresh"))
        .unwrap()
        .permissions()
        .mode();
    assert_ne!(mode & 0o2000, 0, "mode {mode:o} lacks set-group-ID");
}

#[tokio::test]
async fn divergence_invalidates_the_rest_of_the_prefix() {
    let fx = Fixture::new();
    let (a, b, c, d, e) = (
        fx.step("a"),
        fx.step("b"),
        fx.step("c"),
        fx.step("d"),
        fx.step("e"),
    );

    fx.build(false)
        .run(&[task("app", &[a.clone(), b.clone(), c.clone()])])
        .await
        .unwrap();

    let summary = fx
        .build(false)
        .run(&[task("app", &[a.clone(), b.clone(), d.clone(), e.clone()])])
        .await
        .unwrap();

    assert_eq!(
        summary,
        RunSummary {
            tasks: 1,
            executed: 2,
            cached: 2,
            invalidated: 1
        }
    );
    assert_eq!(fx.log(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(fx.markers("app"), done(&[&a, &b, &d, &e]));
}

#[tokio::test]
async fn webserver_redefinition() {
    let fx = Fixture::new();
    let install = fx.step("install-nginx");
    let enable = fx.step("enable-nginx");
    let enable_and_start = fx.step("enable-and-start-nginx");

    fx.build(false)
        .run(&[task("webserver", &[install.clone(), enable.clone()])])
        .await
        .unwrap();
    assert_eq!(fx.markers("webserver"), done(&[&install, &enable]));

    fx.build(false)
        .run(&[task("webserver", &[install.clone(), enable_and_start.clone()])])
        .await
        .unwrap();
    assert_eq!(fx.markers("webserver"), done(&[&install, &enable_and_start]));
}

#[tokio::test]
async fn corrupt_marker_names_task_and_value() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.root.join("broken")).unwrap();
    fs::write(fx.root.join("broken").join("abc123.done"), "").unwrap();

    let err = fx
        .build(false)
        .run(&[task("broken", &[fx.step("x")])])
        .await
        .unwrap_err();

    match err {
        Error::CacheTreeCorruption { task, checksum } => {
            assert_eq!(task, "broken");
            assert_eq!(checksum, "abc123");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fx.log().is_empty());
}

#[tokio::test]
async fn failed_run_resumes_at_the_failing_command() {
    let fx = Fixture::new();
    let flag = fx.work.join("allow");
    let gate = Command::from(format!(
        "test -f {} && echo gate >> {}",
        flag.display(),
        fx.work.join("log").display()
    ));
    let commands = vec![fx.step("one"), fx.step("two"), gate.clone(), fx.step("four")];
    let tasks = vec![task("resumable", &commands)];

    let err = fx.build(false).run(&tasks).await.unwrap_err();
    assert!(matches!(err, Error::Execution { .. }));
    assert_eq!(fx.log(), vec!["one", "two"]);

    let mut expected = done(&[&commands[0], &commands[1]]);
    expected.insert(format!("{}.failed", gate.checksum()));
    assert_eq!(fx.markers("resumable"), expected);

    fs::write(&flag, "").unwrap();
    let summary = fx.build(false).run(&tasks).await.unwrap();
    assert_eq!(summary.cached, 2);
    assert_eq!(summary.executed, 2);
    assert_eq!(fx.log(), vec!["one", "two", "gate", "four"]);
    assert!(fx
        .markers("resumable")
        .contains(&format!("{}.failed", gate.checksum())));
}

#[tokio::test]
async fn dry_run_leaves_the_target_untouched() {
    let fx = Fixture::new();
    let (a, b) = (fx.step("a"), fx.step("b"));
    fx.build(false)
        .run(&[task("app", &[a.clone(), b.clone()])])
        .await
        .unwrap();
    let before = snapshot(fx.dir.path());

    let summary = fx
        .build(true)
        .run(&[
            task("app", &[a.clone(), fx.step("changed")]),
            task("other", &[fx.step("new")]),
        ])
        .await
        .unwrap();

    assert_eq!(summary.invalidated, 1);
    assert_eq!(summary.executed, 2);
    assert_eq!(snapshot(fx.dir.path()), before);
}

#[tokio::test]
async fn missing_cache_root_is_an_empty_tree() {
    let fx = Fixture::new();
    let tree = fx.build(true).checksum_tree().await.unwrap();
    assert!(tree.is_empty());

    fx.build(false)
        .run(&[task("t", &[fx.step("x")])])
        .await
        .unwrap();
    let tree = fx.build(true).checksum_tree().await.unwrap();
    assert_eq!(tree.get("t").unwrap().len(), 1);
    assert!(tree
        .get("t")
        .unwrap()
        .contains(&Checksum::of(&format!("echo x >> {}", fx.work.join("log").display()))));
}
