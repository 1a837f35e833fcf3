//! Repeated ticking of a [`SessionDriver`] until cancelled.
//!
//! Cancellation is only observed between ticks, so an exchange with the
//! device is never cut in half.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use devinfo_core::constants::RESET_LOOP_THRESHOLD;
use devinfo_protocol::{ProtocolState, Transition};
use devinfo_transport::Transport;

use crate::driver::{SessionDriver, SessionStats};
use crate::error::Result;

/// Why a [`DriveLoop::run`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The cancellation token fired.
    Cancelled,

    /// The configured tick budget was used up.
    TickLimit,
}

/// Summary of one [`DriveLoop::run`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveSummary {
    /// Ticks performed by this run.
    pub ticks: u64,

    /// Whether the pipeline completed at least once during this run.
    pub completed: bool,

    pub stop_reason: StopReason,

    /// State the driver was left in.
    pub final_state: ProtocolState,

    /// Driver counters at the end of the run.
    pub stats: SessionStats,
}

/// Ticks a session driver until cancelled or out of budget.
///
/// # Examples
///
/// ```
/// use devinfo_session::{DriveLoop, SessionDriver, StopReason};
/// use devinfo_transport::MockTransport;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> devinfo_session::Result<()> {
///     let (port, handle) = MockTransport::new();
///     let mut driver = SessionDriver::new(port);
///     handle.reply(vec![0x00]).await?;
///
///     let summary = DriveLoop::new()
///         .with_max_ticks(1)
///         .run(&mut driver, CancellationToken::new())
///         .await?;
///
///     assert_eq!(summary.stop_reason, StopReason::TickLimit);
///     assert_eq!(summary.ticks, 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveLoop {
    /// Pause between ticks.
    tick_interval: Option<Duration>,

    /// Stop after this many ticks.
    max_ticks: Option<u64>,

    /// Resets without a completion in between before warning.
    reset_loop_threshold: u32,
}

impl DriveLoop {
    /// Loop with no pacing, no tick limit and the default reset-loop threshold.
    pub fn new() -> Self {
        Self {
            tick_interval: None,
            max_ticks: None,
            reset_loop_threshold: RESET_LOOP_THRESHOLD,
        }
    }

    /// Sleep `interval` between ticks. A zero interval disables pacing.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Stop after `max_ticks` ticks.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn with_reset_loop_threshold(mut self, threshold: u32) -> Self {
        self.reset_loop_threshold = threshold.max(1);
        self
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval
    }

    pub fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }

    /// Tick `driver` until `cancel` fires or the tick budget runs out.
    ///
    /// Completion is reported once per run, the first time the final query is
    /// acknowledged. The driver keeps ticking afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first transport error. The driver keeps its state.
    pub async fn run<T: Transport>(
        &self,
        driver: &mut SessionDriver<T>,
        cancel: CancellationToken,
    ) -> Result<DriveSummary> {
        let channel = driver.transport().describe();
        info!(transport = %channel, state = %driver.current_state(), "Starting session");

        let mut ticks = 0u64;
        let mut completed = false;
        let mut resets_since_completion = 0u32;

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break StopReason::TickLimit;
            }

            let outcome = driver.tick().await?;
            ticks += 1;

            match outcome.transition {
                Transition::Reset => {
                    resets_since_completion += 1;
                    if resets_since_completion % self.reset_loop_threshold == 0 {
                        warn!(
                            resets = resets_since_completion,
                            "Device keeps rejecting identity queries"
                        );
                    }
                }
                Transition::Complete => {
                    resets_since_completion = 0;
                    if !completed {
                        completed = true;
                        info!(identity = %driver.identity(), "Device identity retrieved");
                    }
                }
                Transition::Advance(_) | Transition::Retry => {}
            }

            if let Some(interval) = self.tick_interval {
                tokio::select! {
                    _ = cancel.cancelled() => break StopReason::Cancelled,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        };

        debug!(ticks, reason = ?stop_reason, "Session stopped");

        Ok(DriveSummary {
            ticks,
            completed,
            stop_reason,
            final_state: driver.current_state(),
            stats: *driver.stats(),
        })
    }
}

impl Default for DriveLoop {
    fn default() -> Self {
        Self::new()
    }
}
