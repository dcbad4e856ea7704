use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fleetstats::{
    actors::scheduler::{IntervalTicker, SchedulerHandle},
    api::{ApiConfig, ApiState, spawn_api_server},
    collector::{Collector, StatsFetcher},
    config::read_config_file,
    storage::{MemoryStore, StatsStore},
};
use tokio::sync::broadcast;
use tracing::{debug, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("fleetstats", LevelFilter::DEBUG),
        ("fleetstats_collector", LevelFilter::TRACE),
        ("tower_http", LevelFilter::DEBUG),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let fetcher = StatsFetcher::new(config.collection.leaf_port, config.collection.timeout())
        .context("could not build HTTP client")?;
    let collector = Arc::new(Collector::new(
        config.discovery.build(),
        store.clone(),
        fetcher,
    ));

    let (cycle_tx, _) = broadcast::channel(16);
    let (scheduler, scheduler_task) = SchedulerHandle::spawn(
        collector,
        IntervalTicker::new(config.collection.interval()),
        cycle_tx,
    );
    debug!(
        "collecting every {}s",
        config.collection.interval().as_secs()
    );

    let api_config = ApiConfig {
        bind_addr: config.bind,
    };
    spawn_api_server(api_config, ApiState::new(store)).await?;

    tokio::signal::ctrl_c()
        .await
        .context("could not listen for shutdown signal")?;
    info!("shutting down");

    scheduler.shutdown().await?;
    scheduler_task.await?;

    Ok(())
}
