use groundwork_config::Config;
use groundwork_core::Result;

/// Print every compiled task with its command checksums, in execution order
pub fn execute(config: Config) -> Result<()> {
    let tasks = config.host()?.compile()?;
    for task in &tasks {
        println!("{}", task.name());
        for command in task.commands() {
            println!("  {}  {}", command.checksum, command.log);
        }
    }
    Ok(())
}
