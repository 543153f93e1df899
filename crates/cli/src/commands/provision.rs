use crate::Output;
use groundwork_config::Config;
use groundwork_core::events::{ConsoleSubscriber, JsonLogSubscriber};
use groundwork_core::Result;
use groundwork_engine::{provision, Build};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

pub async fn execute(
    mut config: Config,
    dry_run: bool,
    events_log: Option<PathBuf>,
    output: Arc<Output>,
) -> Result<()> {
    config.settings.dry_run |= dry_run;
    let mut host = config.host()?;
    let build = Build::new(&config.hostname, config.transport(), config.settings.clone());

    let console = ConsoleSubscriber::with_config(
        std::io::stderr().is_terminal(),
        output.verbosity,
    );
    build.events().add_subscriber(Arc::new(console)).await;

    let json_log = match events_log {
        Some(path) => {
            let subscriber = Arc::new(JsonLogSubscriber::new(path).await?);
            build.events().add_subscriber(subscriber.clone()).await;
            Some(subscriber)
        }
        None => None,
    };

    let span = groundwork_utils::run_span(&config.hostname, config.settings.dry_run);
    let result = provision(&mut host, &build).instrument(span).await;

    if let Some(log) = json_log {
        log.close().await;
    }

    let summary = result?;
    let suffix = if config.settings.dry_run {
        " (dry run)"
    } else {
        ""
    };
    println!(
        "{}: {} tasks, {} executed, {} cached, {} invalidated{suffix}",
        config.hostname, summary.tasks, summary.executed, summary.cached, summary.invalidated
    );
    Ok(())
}
