//! Actor-based collection scheduling
//!
//! The scheduler runs as an independent tokio task and is controlled through
//! an mpsc command channel. Completed cycles are published on a broadcast
//! channel for anyone who wants to observe progress.
//!
//! ```text
//!   Ticker ──tick──> SchedulerActor ──run_cycle──> Collector ──put──> Store
//!                      ↑        │
//!   SchedulerHandle ───┘        └──> broadcast<CycleEvent>
//! ```

pub mod messages;
pub mod scheduler;
