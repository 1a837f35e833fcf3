//! Session driver for the identity query pipeline.
//!
//! The driver owns the transport and exactly one [`ProtocolState`]. Each call
//! to [`SessionDriver::tick`] performs one exchange with the device:
//!
//! 1. build the current state's command frame
//! 2. transmit it
//! 3. receive up to the state's response length within the configured timeout
//! 4. classify the response with the state's pattern
//! 5. apply the transition the state chooses
//!
//! There are no driver-level retries: a retry is simply the next tick sending
//! the same request again.
//!
//! # Examples
//!
//! ```
//! use devinfo_protocol::ProtocolState;
//! use devinfo_session::SessionDriver;
//! use devinfo_transport::MockTransport;
//!
//! #[tokio::main]
//! async fn main() -> devinfo_session::Result<()> {
//!     let (port, handle) = MockTransport::new();
//!     let mut driver = SessionDriver::new(port);
//!
//!     handle.reply(vec![0x00]).await?;
//!     let outcome = driver.tick().await?;
//!
//!     assert_eq!(outcome.state, ProtocolState::HaltStream);
//!     assert_eq!(driver.current_state(), ProtocolState::GetInterval);
//!     Ok(())
//! }
//! ```
//!
//! # Builder Pattern
//!
//! ```
//! use std::time::Duration;
//! use devinfo_protocol::ProtocolState;
//! use devinfo_session::{SessionConfig, SessionDriver};
//! use devinfo_transport::MockTransport;
//!
//! let (port, _handle) = MockTransport::new();
//! let driver = SessionDriver::builder(port)
//!     .with_initial_state(ProtocolState::VendorCode)
//!     .with_config(SessionConfig::default().with_receive_timeout(Duration::from_millis(200)))
//!     .build();
//!
//! assert_eq!(driver.current_state(), ProtocolState::VendorCode);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use devinfo_core::DeviceIdentity;
use devinfo_core::constants::{DEFAULT_TIMEOUT_MS, MAX_HISTORY_SIZE};
use devinfo_protocol::{Classification, ProtocolState, Transition, to_hex};
use devinfo_transport::Transport;

use crate::error::Result;

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long `tick` waits for the response bytes.
    pub receive_timeout: Duration,
}

impl SessionConfig {
    /// Set the receive timeout.
    pub fn with_receive_timeout(mut self, receive_timeout: Duration) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Represents a single state transition with timestamp.
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
/// When deserializing, it is set to the time of deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: ProtocolState,

    /// The state transitioned to.
    pub to: ProtocolState,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    /// Create a new state transition record stamped with the current time.
    pub fn new(from: ProtocolState, to: ProtocolState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

impl fmt::Display for StateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Counters accumulated over the lifetime of a driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Completed ticks.
    pub ticks: u64,

    /// State changes, forced resets included.
    pub transitions: u64,

    /// Returns to the initial state after a NAK or a forced reset.
    pub resets: u64,

    /// Ticks that kept the current state to send the same request again.
    pub retries: u64,

    /// Responses shorter than the state's minimum length.
    pub short_reads: u64,

    /// Responses that matched neither the ack nor the nak pattern.
    pub mismatches: u64,

    /// Acknowledged responses to the final query.
    pub completions: u64,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    /// State the tick ran in.
    pub state: ProtocolState,

    /// Length of the frame that was sent.
    pub frame_len: usize,

    /// Bytes accepted by the transport.
    pub bytes_written: usize,

    /// Bytes received before the timeout.
    pub response_len: usize,

    /// How the response was judged.
    pub classification: Classification,

    /// Decision taken by the state.
    pub transition: Transition,

    /// State the driver is in after the tick.
    pub next_state: ProtocolState,
}

impl TickOutcome {
    /// Whether the tick moved the driver to another state.
    pub fn changed_state(&self) -> bool {
        self.state != self.next_state
    }
}

/// Drives the identity query pipeline over a [`Transport`].
///
/// The driver is not shareable: `tick` takes `&mut self`, so at most one
/// exchange is ever in flight on the transport.
pub struct SessionDriver<T: Transport> {
    /// Channel to the device.
    transport: T,

    /// Active protocol step.
    current_state: ProtocolState,

    /// Identity fields collected since the last reset.
    identity: DeviceIdentity,

    /// Recent state changes (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,

    /// Lifetime counters.
    stats: SessionStats,

    config: SessionConfig,
}

impl<T: Transport> SessionDriver<T> {
    /// Create a driver starting at [`ProtocolState::INITIAL`] with default settings.
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    /// Create a builder for a driver with custom settings.
    pub fn builder(transport: T) -> SessionDriverBuilder<T> {
        SessionDriverBuilder {
            transport,
            initial_state: ProtocolState::INITIAL,
            config: SessionConfig::default(),
        }
    }

    /// Perform one request/response exchange and apply the resulting transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails. The current state is left
    /// unchanged in that case.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let state = self.current_state;
        let frame = state.command();

        debug!(state = %state, frame = %frame, "Sending request");
        let bytes_written = self.transport.transmit(frame.as_bytes()).await?;

        let response = self
            .transport
            .receive(state.response_length(), self.config.receive_timeout)
            .await?;

        let classification = state.classify(&response);
        let transition = state.transition(classification);
        debug!(
            state = %state,
            response = %to_hex(&response),
            classification = %classification,
            "Response classified"
        );

        self.stats.ticks += 1;
        self.note_classification(state, classification, response.len());
        self.apply(state, transition, &response);

        Ok(TickOutcome {
            state,
            frame_len: frame.len(),
            bytes_written,
            response_len: response.len(),
            classification,
            transition,
            next_state: self.current_state,
        })
    }

    /// Force the pipeline back to [`ProtocolState::INITIAL`].
    ///
    /// Collected identity fields are discarded.
    pub fn reset(&mut self) -> StateTransition {
        self.stats.resets += 1;
        self.identity.clear();
        self.perform_state_change(ProtocolState::INITIAL)
    }

    /// Get the current state.
    pub fn current_state(&self) -> ProtocolState {
        self.current_state
    }

    /// Whether the final query has been acknowledged since the last reset.
    pub fn is_complete(&self) -> bool {
        self.identity.retrieved_at().is_some()
    }

    /// Identity fields collected since the last reset.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Recent state changes, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last `count` state changes, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the driver and hand back the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn note_classification(
        &mut self,
        state: ProtocolState,
        classification: Classification,
        received: usize,
    ) {
        match classification {
            Classification::Incomplete => {
                self.stats.short_reads += 1;
                debug!(
                    state = %state,
                    received,
                    expected = state.response_length(),
                    "Short read"
                );
            }
            Classification::Unrecognized => {
                self.stats.mismatches += 1;
                debug!(state = %state, received, "Response did not match the expected header");
            }
            Classification::Ack | Classification::Nak => {}
        }
    }

    fn apply(&mut self, state: ProtocolState, transition: Transition, response: &[u8]) {
        match transition {
            Transition::Advance(next) => {
                self.store_payload(state, response);
                self.perform_state_change(next);
            }
            Transition::Retry => {
                self.stats.retries += 1;
            }
            Transition::Reset => {
                warn!(state = %state, "Device rejected request, restarting from {}", ProtocolState::INITIAL);
                self.stats.resets += 1;
                self.identity.clear();
                self.perform_state_change(ProtocolState::INITIAL);
            }
            Transition::Complete => {
                self.store_payload(state, response);
                self.identity.mark_retrieved(Utc::now());
                self.stats.completions += 1;
                debug!(state = %state, "Pipeline complete");
            }
        }
    }

    fn store_payload(&mut self, state: ProtocolState, response: &[u8]) {
        if let (Some(field), Some(payload)) = (state.component_field(), state.payload(response)) {
            self.identity.set(field, payload);
        }
    }

    fn perform_state_change(&mut self, new_state: ProtocolState) -> StateTransition {
        let transition = StateTransition::new(self.current_state, new_state);
        info!(from = %transition.from, to = %transition.to, "State changed to {}", new_state);

        self.current_state = new_state;
        self.stats.transitions += 1;

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        transition
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for SessionDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDriver")
            .field("transport", &self.transport)
            .field("current_state", &self.current_state)
            .field("identity", &self.identity)
            .field("stats", &self.stats)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SessionDriver`].
pub struct SessionDriverBuilder<T: Transport> {
    transport: T,
    initial_state: ProtocolState,
    config: SessionConfig,
}

impl<T: Transport> SessionDriverBuilder<T> {
    /// Start in `state` instead of [`ProtocolState::INITIAL`].
    pub fn with_initial_state(mut self, state: ProtocolState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the driver.
    pub fn build(self) -> SessionDriver<T> {
        SessionDriver {
            transport: self.transport,
            current_state: self.initial_state,
            identity: DeviceIdentity::new(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            stats: SessionStats::default(),
            config: self.config,
        }
    }
}
