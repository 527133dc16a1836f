use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use feeder::cli::{Cli, Commands};
use feeder::config::Config;
use feeder::domain::format_published;
use feeder::errors::FeederError;
use feeder::services::{NotificationService, Poller, Scheduler};
use feeder::sources::DevLifeSource;
use feeder::storage::{FileWatermarkStore, WatermarkStore};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        if let Some(FeederError::MissingEnvVar(name)) = e.downcast_ref::<FeederError>() {
            println!(
                "Please set environment SLACK_CHAN and SLACK_WEBHOOK_URL ({} is missing)",
                name
            );
            std::process::exit(0);
        }

        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Watermark) => cmd_watermark(),
        Some(Commands::Reset) => cmd_reset(),
        Some(Commands::Once { dry_run }) => cmd_once(&load_config(cli.sleep)?, dry_run),
        Some(Commands::Run { dry_run }) => cmd_run(load_config(cli.sleep)?, dry_run),
        None => cmd_run(load_config(cli.sleep)?, false),
    }
}

fn load_config(sleep: u64) -> anyhow::Result<Config> {
    Ok(Config::from_env()?.with_poll_interval(sleep)?)
}

fn build_poller(
    config: &Config,
    dry_run: bool,
) -> anyhow::Result<Poller<DevLifeSource, NotificationService, FileWatermarkStore>> {
    let source = DevLifeSource::new(&config.feed_url);
    let notifier =
        NotificationService::new(config).context("failed to build webhook client")?;
    let store = FileWatermarkStore::new(&config.watermark_path);

    Ok(Poller::new(source, notifier, store).with_dry_run(dry_run))
}

fn cmd_run(config: Config, dry_run: bool) -> anyhow::Result<()> {
    let poller = Arc::new(build_poller(&config, dry_run)?);

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        shutdown_tx.send(()).ok();
    })
    .context("failed to install signal handler")?;

    info!(
        feed = %config.feed_url,
        channel = %config.channel,
        watermark = %config.watermark_path.display(),
        "polling every {} min",
        config.poll_interval.as_secs() / 60
    );

    Scheduler::new(config.poll_interval).run(move || poller.run_tick(), &shutdown_rx);

    info!("exit by signal");
    Ok(())
}

fn cmd_once(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let poller = build_poller(config, dry_run)?;
    let report = poller.tick().context("feed check failed")?;

    println!(
        "Fetched {} items, {} new, {} sent, {} failed.",
        report.fetched, report.selected, report.delivered, report.failed
    );
    if let Some(watermark) = report.watermark {
        println!("Watermark advanced to {}", watermark);
    }

    Ok(())
}

fn cmd_watermark() -> anyhow::Result<()> {
    let store = FileWatermarkStore::new(Config::watermark_path_from_env());
    let watermark = store.load()?;

    println!(
        "{} ({})",
        watermark,
        watermark.to_rfc3339().unwrap_or_else(|| "out of range".to_string())
    );
    if let Some(published) = format_published(watermark.timestamp()) {
        println!("  Feed time: {}", published);
    }
    println!("  File: {}", store.path().display());

    Ok(())
}

fn cmd_reset() -> anyhow::Result<()> {
    let store = FileWatermarkStore::new(Config::watermark_path_from_env());

    if store.clear()? {
        println!("Removed {}", store.path().display());
    } else {
        println!("No watermark stored at {}", store.path().display());
    }

    Ok(())
}
