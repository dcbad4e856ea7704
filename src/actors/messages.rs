//! Message types for actor communication
//!
//! 1. **Commands**: request/response messages sent to the scheduler via mpsc
//! 2. **Events**: cycle reports broadcast to any interested subscriber

use tokio::sync::oneshot;

use crate::collector::CycleReport;

/// Event published after every completed collection cycle
///
/// Subscribers may lag or miss events; the store stays the source of truth.
#[derive(Debug, Clone)]
pub struct CycleEvent {
    /// Sequence number of the cycle since the scheduler started (first is 1)
    pub cycle: u64,

    pub report: CycleReport,
}

/// Commands that can be sent to the SchedulerActor
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Run a cycle immediately, outside the regular ticks
    RunNow {
        respond_to: oneshot::Sender<CycleReport>,
    },

    /// Stop the scheduler
    ///
    /// An in-flight cycle finishes before the actor exits.
    Shutdown,
}
