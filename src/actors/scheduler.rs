//! SchedulerActor - drives the collector on a fixed period
//!
//! ## Message Flow
//!
//! ```text
//! Ticker tick → Collector::run_cycle → publish CycleEvent
//!     ↑
//!     └─── Commands (RunNow, Shutdown)
//! ```
//!
//! The first tick of `IntervalTicker` fires immediately, so the fleet is
//! polled once at start and then every period. A slow cycle delays the next
//! tick instead of overlapping with it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, instrument, trace, warn};

use super::messages::{CycleEvent, SchedulerCommand};
use crate::collector::{Collector, CycleReport};

/// Time source for the scheduler
#[async_trait]
pub trait Ticker: Send + 'static {
    /// Wait until the next cycle is due
    async fn tick(&mut self);
}

/// Ticks immediately, then once per period
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticks whenever the paired sender is used
///
/// Once every sender is dropped the ticker never fires again.
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ManualTicker {
    pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

pub struct SchedulerActor<T: Ticker> {
    collector: Arc<Collector>,
    ticker: T,
    command_rx: mpsc::Receiver<SchedulerCommand>,
    cycle_tx: broadcast::Sender<CycleEvent>,
    cycles: u64,
}

impl<T: Ticker> SchedulerActor<T> {
    pub fn new(
        collector: Arc<Collector>,
        ticker: T,
        command_rx: mpsc::Receiver<SchedulerCommand>,
        cycle_tx: broadcast::Sender<CycleEvent>,
    ) -> Self {
        Self {
            collector,
            ticker,
            command_rx,
            cycle_tx,
            cycles: 0,
        }
    }

    /// Run until a Shutdown command arrives or every handle is dropped
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting scheduler");

        loop {
            tokio::select! {
                _ = self.ticker.tick() => {
                    self.cycle().await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::RunNow { respond_to }) => {
                            debug!("received RunNow command");
                            let report = self.cycle().await;
                            let _ = respond_to.send(report);
                        }

                        Some(SchedulerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("scheduler stopped after {} cycles", self.cycles);
    }

    async fn cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let report = self.collector.run_cycle().await;

        let event = CycleEvent {
            cycle: self.cycles,
            report: report.clone(),
        };
        if self.cycle_tx.send(event).is_err() {
            trace!("no receivers for cycle event");
        }

        report
    }
}

/// Handle for controlling a SchedulerActor
#[derive(Clone)]
pub struct SchedulerHandle {
    sender: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Spawn the actor as a tokio task
    ///
    /// The returned `JoinHandle` resolves once the actor has stopped.
    pub fn spawn<T: Ticker>(
        collector: Arc<Collector>,
        ticker: T,
        cycle_tx: broadcast::Sender<CycleEvent>,
    ) -> (Self, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = SchedulerActor::new(collector, ticker, cmd_rx, cycle_tx);
        let task = tokio::spawn(actor.run());

        (Self { sender: cmd_tx }, task)
    }

    /// Run a cycle now and wait for its report
    pub async fn run_now(&self) -> Result<CycleReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SchedulerCommand::RunNow { respond_to: tx })
            .await
            .context("failed to send RunNow command")?;

        rx.await.context("failed to receive cycle report")
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SchedulerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
