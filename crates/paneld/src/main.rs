use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

use paneld::config::Config;
use paneld::engine::Engine;
use paneld::engine::Panel;
use paneld::frontends::ConsoleFrontend;

/// Simulated multi-room home-automation control panel.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "paneld.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // A missing config file is fine: every setting has a default.
    let (config, loaded) = if args.config.exists() {
        let config = Config::from_file(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?;
        (config, true)
    } else {
        (Config::default(), false)
    };

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(config.logging.level))
        .init();

    info!("paneld starting");
    if loaded {
        info!("loaded config from {}", args.config.display());
    } else {
        info!("no config file at {}, using defaults", args.config.display());
    }

    let credentials = config
        .credentials
        .into_credentials()
        .context("invalid [credentials] configuration")?;

    let mut engine = Engine::new(Panel::new(credentials));
    engine.register_frontend(Box::new(ConsoleFrontend::new()));

    tokio::select! {
        result = engine.run() => {
            if let Err(e) = result {
                tracing::error!("engine stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    info!("paneld shutdown complete");
    Ok(())
}
