#![warn(missing_docs)]
//! # login-wall-gate
//!
//! ## Purpose
//! Waits for the host to inject its API and settles the page's readiness.
//!
//! ## Responsibilities
//! - Poll the [`HostSlot`] on a fixed interval for a bounded number of
//!   attempts ([`ReadinessGate`]).
//! - Report exhaustion and cancellation as explicit [`GateOutcome`]s.
//! - Publish the settled [`ReadinessState`] once through [`ReadinessSignal`].
//! - Compute capped page reloads for the reload-on-exhaustion fallback
//!   ([`ReloadPolicy`]).
//!
//! ## Data flow
//! Host injects into slot -> gate tick observes it -> [`GateOutcome::Ready`]
//! -> signal flips to ready -> controllers are constructed with the handle.
//!
//! ## Ownership and lifetimes
//! The gate shares the slot and signal through `Arc`; the handle it yields is
//! a cheap clone of the injected `Arc<dyn HostApi>`.
//!
//! ## Error model
//! Only construction can fail ([`GateError`]). Running the gate never fails;
//! it always finishes with a handle, exhaustion, or cancellation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use login_wall_host::{HostHandle, HostSlot};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use url::Url;

/// Query parameter carrying the reload counter.
pub const RETRY_PARAM: &str = "retry";

/// Poll schedule for the readiness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    max_attempts: u32,
    interval: Duration,
}

impl GateConfig {
    /// Creates a validated schedule.
    ///
    /// # Errors
    /// Returns [`GateError::ZeroInterval`] when `interval` is zero.
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self, GateError> {
        if interval.is_zero() {
            return Err(GateError::ZeroInterval);
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    /// Number of interval ticks checked after the immediate check.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Spacing between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time after which the gate reports exhaustion.
    pub fn deadline(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// How a gate run finished.
#[derive(Clone)]
pub enum GateOutcome {
    /// The host injected its handle.
    Ready(HostHandle),
    /// Every attempt elapsed without a handle.
    Exhausted {
        /// Number of interval ticks checked.
        attempts: u32,
    },
    /// The caller cancelled the wait.
    Cancelled,
}

impl GateOutcome {
    /// Returns the handle for [`GateOutcome::Ready`].
    pub fn handle(&self) -> Option<HostHandle> {
        match self {
            Self::Ready(handle) => Some(handle.clone()),
            Self::Exhausted { .. } | Self::Cancelled => None,
        }
    }

    /// Returns `true` for [`GateOutcome::Ready`].
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Debug for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready(..)"),
            Self::Exhausted { attempts } => {
                f.debug_struct("Exhausted").field("attempts", attempts).finish()
            }
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Page readiness as seen by other components.
#[derive(Clone, Default)]
pub enum ReadinessState {
    /// Gate has not settled.
    #[default]
    Pending,
    /// Host handle is available.
    Ready(HostHandle),
    /// Gate exhausted; the page runs without a host.
    Unavailable,
}

impl ReadinessState {
    /// Returns `true` once the state can no longer change.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Debug for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Ready(_) => f.write_str("Ready(..)"),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Ready flag plus a one-shot readiness notification.
#[derive(Debug)]
pub struct ReadinessSignal {
    tx: watch::Sender<ReadinessState>,
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessSignal {
    /// Creates a signal in the pending state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadinessState::Pending);
        Self { tx }
    }

    /// Settles the signal. Returns `false` when it had already settled or
    /// `state` is [`ReadinessState::Pending`].
    pub fn publish(&self, state: ReadinessState) -> bool {
        if !state.is_settled() {
            return false;
        }
        self.tx.send_if_modified(|current| {
            if current.is_settled() {
                return false;
            }
            *current = state;
            true
        })
    }

    /// Global ready flag.
    pub fn is_ready(&self) -> bool {
        matches!(*self.tx.borrow(), ReadinessState::Ready(_))
    }

    /// Current state snapshot.
    pub fn state(&self) -> ReadinessState {
        self.tx.borrow().clone()
    }

    /// Subscribes to the readiness notification.
    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.tx.subscribe()
    }
}

/// Bounded poll for the host handle.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    slot: Arc<HostSlot>,
    config: GateConfig,
    signal: Arc<ReadinessSignal>,
}

impl ReadinessGate {
    /// Creates a gate with a private readiness signal.
    pub fn new(slot: Arc<HostSlot>, config: GateConfig) -> Self {
        Self::with_signal(slot, config, Arc::new(ReadinessSignal::new()))
    }

    /// Creates a gate publishing into a shared readiness signal.
    pub fn with_signal(
        slot: Arc<HostSlot>,
        config: GateConfig,
        signal: Arc<ReadinessSignal>,
    ) -> Self {
        Self {
            slot,
            config,
            signal,
        }
    }

    /// Readiness signal this gate publishes into.
    pub fn signal(&self) -> &Arc<ReadinessSignal> {
        &self.signal
    }

    /// Poll schedule.
    pub fn config(&self) -> GateConfig {
        self.config
    }

    /// Waits for the handle until it appears or attempts run out.
    pub async fn wait(&self) -> GateOutcome {
        self.wait_until(std::future::pending::<()>()).await
    }

    /// Waits for the handle, giving up early when `cancel` completes.
    ///
    /// Ready and exhausted outcomes are published to the readiness signal;
    /// a cancelled wait leaves it pending.
    pub async fn wait_until<F>(&self, cancel: F) -> GateOutcome
    where
        F: Future<Output = ()>,
    {
        let outcome = tokio::select! {
            biased;
            () = cancel => GateOutcome::Cancelled,
            outcome = self.poll() => outcome,
        };

        match &outcome {
            GateOutcome::Ready(handle) => {
                self.signal.publish(ReadinessState::Ready(handle.clone()));
                info!("host api ready");
            }
            GateOutcome::Exhausted { attempts } => {
                self.signal.publish(ReadinessState::Unavailable);
                warn!(
                    attempts,
                    deadline = ?self.config.deadline(),
                    "host api unavailable after polling"
                );
            }
            GateOutcome::Cancelled => debug!("readiness wait cancelled"),
        }

        outcome
    }

    async fn poll(&self) -> GateOutcome {
        if let Some(handle) = self.slot.get() {
            return GateOutcome::Ready(handle);
        }

        let interval = self.config.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for attempt in 1..=self.config.max_attempts {
            ticker.tick().await;
            if let Some(handle) = self.slot.get() {
                debug!(attempt, "host api found");
                return GateOutcome::Ready(handle);
            }
            debug!(
                attempt,
                remaining = self.config.max_attempts - attempt,
                "host api not injected yet"
            );
        }

        GateOutcome::Exhausted {
            attempts: self.config.max_attempts,
        }
    }
}

/// Reload-on-exhaustion with a counter carried in the page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadPolicy {
    /// Reloads allowed before the page gives up and stays hostless.
    pub cap: u32,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self { cap: 2 }
    }
}

impl ReloadPolicy {
    /// Reads the reload counter from `url`; absent or unparsable is zero.
    pub fn retry_count(url: &Url) -> u32 {
        url.query_pairs()
            .find(|(key, _)| key == RETRY_PARAM)
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(0)
    }

    /// Returns the URL to reload with an incremented counter, or `None` once
    /// the cap has been reached.
    pub fn next_reload(&self, current: &Url) -> Option<Url> {
        let retry = Self::retry_count(current);
        if retry >= self.cap {
            error!(retry, cap = self.cap, "reload cap reached; staying on page");
            return None;
        }

        let kept: Vec<(String, String)> = current
            .query_pairs()
            .filter(|(key, _)| key != RETRY_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut next = current.clone();
        {
            let mut pairs = next.query_pairs_mut();
            pairs.clear();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(RETRY_PARAM, &(retry + 1).to_string());
        }
        info!(retry = retry + 1, cap = self.cap, "reloading page for host api");
        Some(next)
    }
}

/// Gate construction errors.
#[derive(Debug, Error)]
pub enum GateError {
    /// A zero poll interval would spin.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}
