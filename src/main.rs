use anyhow::Context;
use dotenv::dotenv;
use ordered_string_map::{logging, shell::Shell, MapConfig, OrderedStringMap};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = MapConfig::from_env().context("Failed to load configuration")?;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    info!(
        capacity_hint = config.capacity_hint,
        "Starting ordered map shell"
    );

    let shell = Shell::new(OrderedStringMap::with_config(&config));
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    shell
        .run(stdin.lock(), stdout.lock())
        .context("Shell terminated with an I/O error")?;

    Ok(())
}
