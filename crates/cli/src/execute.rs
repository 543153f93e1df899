use crate::commands::Commands;
use crate::Output;
use std::sync::Arc;

pub async fn execute_command(command: Commands, output: Arc<Output>) -> eyre::Result<()> {
    command.execute(output).await?;
    Ok(())
}
