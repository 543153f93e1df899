//! The build orchestrator

use crate::settings::BuildSettings;
use groundwork_cache::{plan_task, ChecksumTree, Step};
use groundwork_core::{
    Checksum, Error, EventEmitter, EventKind, ExecStatus, Phase, ProvisionEvent, Result,
};
use groundwork_task::{Host, Task, TaskCommand};
use groundwork_transport::{CommandOutput, Transport};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Totals of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tasks: usize,
    pub executed: usize,
    pub cached: usize,
    pub invalidated: usize,
}

impl RunSummary {
    /// The run left the target untouched
    pub fn is_noop(&self) -> bool {
        self.executed == 0 && self.invalidated == 0
    }
}

/// Provisions compiled tasks on one target
pub struct Build {
    hostname: String,
    transport: Arc<dyn Transport>,
    settings: BuildSettings,
    events: Arc<EventEmitter>,
}

impl Build {
    pub fn new(
        hostname: impl Into<String>,
        transport: Arc<dyn Transport>,
        settings: BuildSettings,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            transport,
            settings,
            events: Arc::new(EventEmitter::default()),
        }
    }

    /// Publish progress through an existing emitter
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.events
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    fn event(&self, kind: EventKind, phase: Phase) -> ProvisionEvent {
        ProvisionEvent::new(kind, phase, &self.hostname).dry_run(self.settings.dry_run)
    }

    async fn run_privileged(&self, script: &str) -> Result<CommandOutput> {
        self.transport.run(&self.settings.privileged(script)).await
    }

    /// Make sure the configured user may maintain the marker tree.
    ///
    /// The access check is read-only and runs in dry runs too; the setup does not.
    #[instrument(skip(self), fields(user = %self.settings.user))]
    pub async fn bootstrap(&self) -> Result<()> {
        self.settings.validate()?;
        let user = self.settings.user.as_str();
        let layout = &self.settings.layout;

        let check = self.run_privileged(&layout.bootstrap_check(user)).await?;
        if check.is_success() {
            debug!("Provisioning access already set up");
            return Ok(());
        }

        let message = format!(
            "adding user {user:?} to group {:?} and creating {}",
            layout.group(),
            layout.root()
        );
        if self.settings.dry_run {
            self.events
                .emit(self.event(EventKind::Internal, Phase::Planned).message(message))
                .await;
            return Ok(());
        }

        self.events
            .emit(self.event(EventKind::Internal, Phase::Started).message(&message))
            .await;
        let setup = self.run_privileged(&layout.bootstrap_setup(user)).await?;
        if !setup.is_success() {
            let error = Error::precondition(format!(
                "failed to initiate user {user:?} for provisioning: exit code {:?}, out={:?} err={:?}",
                setup.exit_code,
                setup.stdout.trim(),
                setup.stderr.trim()
            ));
            self.events
                .emit(self.event(EventKind::Internal, Phase::Failed).error(&error))
                .await;
            return Err(error);
        }
        self.events
            .emit(self.event(EventKind::Internal, Phase::Finished).message(message))
            .await;
        info!("Provisioning access set up");
        Ok(())
    }

    /// Read the completion markers present on the target
    pub async fn checksum_tree(&self) -> Result<ChecksumTree> {
        let layout = &self.settings.layout;
        let output = self.run_privileged(&layout.listing_query()).await?;
        if !output.is_success() {
            return Err(Error::precondition(format!(
                "cannot list completion markers below {}: {}",
                layout.root(),
                output.diagnostic()
            )));
        }
        ChecksumTree::from_listing(layout, &output.stdout)
    }

    /// Provision `tasks` in order, stopping at the first failure
    pub async fn run(&self, tasks: &[Task]) -> Result<RunSummary> {
        self.settings.validate()?;
        let tree = self.checksum_tree().await?;
        let mut summary = RunSummary::default();

        for task in tasks {
            self.events
                .emit(self.event(EventKind::Task, Phase::Started).task(task.name()))
                .await;

            if let Err(e) = self.provision_task(task, &tree, &mut summary).await {
                self.events
                    .emit(
                        self.event(EventKind::Task, Phase::Failed)
                            .task(task.name())
                            .error(&e),
                    )
                    .await;
                return Err(e);
            }

            self.events
                .emit(self.event(EventKind::Task, Phase::Finished).task(task.name()))
                .await;
            summary.tasks += 1;
        }

        info!(
            hostname = %self.hostname,
            tasks = summary.tasks,
            executed = summary.executed,
            cached = summary.cached,
            invalidated = summary.invalidated,
            dry_run = self.settings.dry_run,
            "Run complete"
        );
        Ok(summary)
    }

    #[instrument(skip_all, fields(task_name = %task.name()))]
    async fn provision_task(
        &self,
        task: &Task,
        tree: &ChecksumTree,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let plan = plan_task(&task.checksums(), tree.get(task.name()));
        if !plan.orphaned.is_empty() {
            debug!(
                orphaned = plan.orphaned.len(),
                "Leaving unmatched markers in place"
            );
        }

        if plan.create_dir {
            self.create_task_dir(task.name()).await?;
        }

        for step in &plan.steps {
            match step {
                Step::Cached { index, checksum } => {
                    let command = &task.commands()[*index];
                    self.events
                        .emit(
                            self.event(EventKind::Command, Phase::Finished)
                                .task(task.name())
                                .command(checksum.clone(), &command.log)
                                .status(ExecStatus::Cached),
                        )
                        .await;
                    summary.cached += 1;
                }
                Step::Invalidate(stale) => {
                    self.invalidate(task.name(), stale).await?;
                    summary.invalidated += stale.len();
                }
                Step::Execute { index, checksum } => {
                    self.execute(task.name(), &task.commands()[*index], checksum)
                        .await?;
                    summary.executed += 1;
                }
            }
        }
        Ok(())
    }

    async fn create_task_dir(&self, task: &str) -> Result<()> {
        let dir = self.settings.layout.task_dir(task);
        let message = format!("creating cache directory {dir}");
        if self.settings.dry_run {
            self.events
                .emit(
                    self.event(EventKind::Internal, Phase::Planned)
                        .task(task)
                        .message(message),
                )
                .await;
            return Ok(());
        }

        let output = self
            .run_privileged(&self.settings.layout.create_task_dir(task))
            .await?;
        if !output.is_success() {
            return Err(Error::directory(dir, output.diagnostic()));
        }
        self.events
            .emit(
                self.event(EventKind::Internal, Phase::Finished)
                    .task(task)
                    .message(message),
            )
            .await;
        Ok(())
    }

    async fn invalidate(&self, task: &str, stale: &[Checksum]) -> Result<()> {
        debug!(task_name = %task, count = stale.len(), "Invalidating stale markers");
        if self.settings.dry_run {
            self.events
                .emit(
                    self.event(EventKind::CacheCleanup, Phase::Planned)
                        .task(task)
                        .invalidated(stale.to_vec()),
                )
                .await;
            return Ok(());
        }

        self.events
            .emit(
                self.event(EventKind::CacheCleanup, Phase::Started)
                    .task(task)
                    .invalidated(stale.to_vec()),
            )
            .await;
        let output = self
            .run_privileged(&self.settings.layout.cleanup(task, stale))
            .await?;
        if !output.is_success() {
            return Err(Error::cleanup(task, output.diagnostic()));
        }
        self.events
            .emit(
                self.event(EventKind::CacheCleanup, Phase::Finished)
                    .task(task)
                    .invalidated(stale.to_vec()),
            )
            .await;
        Ok(())
    }

    async fn execute(&self, task: &str, command: &TaskCommand, checksum: &Checksum) -> Result<()> {
        let event = |phase| {
            self.event(EventKind::Command, phase)
                .task(task)
                .command(checksum.clone(), &command.log)
        };

        if self.settings.dry_run {
            self.events
                .emit(event(Phase::Planned).status(ExecStatus::Started))
                .await;
            return Ok(());
        }

        self.events
            .emit(event(Phase::Started).status(ExecStatus::Started))
            .await;
        debug!(task_name = %task, checksum = %checksum, "Executing command");

        let script = self.settings.privileged(&self.settings.with_env(&command.shell));
        let output = match self.transport.run(&script).await {
            Ok(output) => output,
            Err(error) => return Err(self.fail(task, checksum, event(Phase::Failed), error).await),
        };
        let layout = &self.settings.layout;

        if !output.is_success() {
            let error = Error::execution(task, checksum.as_str(), output.exit_code, output.diagnostic());
            return Err(self.fail(task, checksum, event(Phase::Failed), error).await);
        }

        let marked = self.run_privileged(&layout.mark_done(task, checksum)).await?;
        if !marked.is_success() {
            return Err(Error::directory(
                layout.done_marker(task, checksum),
                marked.diagnostic(),
            ));
        }

        self.events
            .emit(event(Phase::Finished).status(ExecStatus::Finished))
            .await;
        Ok(())
    }

    /// Best-effort failure marker, then the `Failed` event carrying `error`
    async fn fail(
        &self,
        task: &str,
        checksum: &Checksum,
        failed: ProvisionEvent,
        error: Error,
    ) -> Error {
        let layout = &self.settings.layout;
        match self.run_privileged(&layout.mark_failed(task, checksum)).await {
            Ok(marked) if marked.is_success() => {}
            Ok(marked) => warn!(
                task_name = %task,
                error = %marked.diagnostic(),
                "Could not write failure marker"
            ),
            Err(e) => warn!(task_name = %task, error = %e, "Could not write failure marker"),
        }
        self.events
            .emit(failed.status(ExecStatus::Finished).error(&error))
            .await;
        error
    }
}

/// Compile the host's packages, bootstrap access and run every task
pub async fn provision(host: &mut Host, build: &Build) -> Result<RunSummary> {
    let tasks = host.compile()?;
    build.bootstrap().await?;
    build.run(&tasks).await
}
