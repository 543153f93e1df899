use groundwork_config::Config;
use groundwork_core::Result;
use groundwork_engine::Build;

/// Print the checksum tree currently recorded on the host
pub async fn execute(config: Config) -> Result<()> {
    let build = Build::new(&config.hostname, config.transport(), config.settings.clone());
    let tree = build.checksum_tree().await?;

    if tree.is_empty() {
        println!(
            "no completion markers below {}",
            config.settings.layout.root()
        );
        return Ok(());
    }

    for (task, checksums) in tree.iter() {
        println!("{task} ({} markers)", checksums.len());
        for checksum in checksums {
            println!("  {checksum}");
        }
    }
    Ok(())
}
