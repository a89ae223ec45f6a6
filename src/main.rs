use anyhow::{Result, bail};
use deckwatch::{
    config::Config,
    presets::{Delivery, PresetRegistry},
};
use tracing::{error, info};

const DRY_RUN_FLAG: &str = "--dry-run";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = PresetRegistry::standard();

    let mut delivery = Delivery::Webhook;
    let mut names = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == DRY_RUN_FLAG {
            delivery = Delivery::DryRun;
        } else {
            names.push(arg);
        }
    }
    if names.is_empty() {
        bail!(
            "usage: deckwatch [{DRY_RUN_FLAG}] <monitor>...\nmonitors: {}",
            registry.names().join(", ")
        );
    }

    let config = Config::from_env()?;

    // Build everything first so a bad name or missing secret stops the
    // process before any alert goes out.
    let monitors = names
        .iter()
        .map(|name| registry.build(name, &config, delivery))
        .collect::<Result<Vec<_>, _>>()?;

    let mut failures = 0;
    for monitor in &monitors {
        match monitor.run().await {
            Ok(report) => info!(monitor = monitor.name(), report = ?report, "monitor done"),
            Err(e) => {
                failures += 1;
                error!(monitor = monitor.name(), error = %e, "monitor failed");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} monitor(s) failed");
    }
    Ok(())
}
