#![warn(missing_docs)]
//! # login-wall-session
//!
//! ## Purpose
//! Drives the session page shown after a successful login.
//!
//! ## Responsibilities
//! - Show the session user's name from the host record.
//! - Run the one-second "Logged in: ..." timer.
//! - Log out: stop the timer, lock the controls, and keep asking the host to
//!   close the view until it acknowledges or the attempt cap is reached.
//!
//! ## Data flow
//! Host `get_user` -> header. [`SessionTimer`] -> timer task ->
//! `status-timer` label. Logout click -> [`SessionController::logout`] ->
//! repeated host `logout` calls -> teardown acknowledgment.
//!
//! ## Ownership and lifetimes
//! The controller owns the timer task exclusively. Stopping it joins the
//! task, so no label write can land after logout has replaced the text.
//!
//! ## Error model
//! View and payload failures propagate as [`SessionError`]. Host logout
//! calls run detached, so a call that fails or never returns is logged and
//! retried; it never stalls or aborts the logout. Calls still pending when
//! the logout settles are cancelled.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use login_wall_core::{CoreError, HostUser, LOGGED_OUT_TEXT, parse_user, timer_label};
use login_wall_host::{HostError, HostHandle};
use login_wall_ui::{ElementId, UiError, UiEvent, ViewSurface};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Resolution of the session timer label.
pub const TIMER_TICK: Duration = Duration::from_secs(1);

/// Alert shown when logout is clicked without a host.
pub const HOSTLESS_LOGOUT_ALERT: &str = "Logout clicked";

/// Retry schedule for host logout calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl LogoutPolicy {
    /// Creates a validated policy.
    ///
    /// # Errors
    /// Returns [`SessionError::ZeroLogoutInterval`] or
    /// [`SessionError::ZeroLogoutAttempts`].
    pub fn new(interval: Duration, max_attempts: u32) -> Result<Self, SessionError> {
        if interval.is_zero() {
            return Err(SessionError::ZeroLogoutInterval);
        }
        if max_attempts == 0 {
            return Err(SessionError::ZeroLogoutAttempts);
        }
        Ok(Self {
            interval,
            max_attempts,
        })
    }

    /// Time waited for teardown after each call.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Maximum number of host `logout` calls.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for LogoutPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3_000),
            max_attempts: 10,
        }
    }
}

/// Lifecycle of the session page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for [`SessionController::start`].
    Initializing,
    /// Timer running.
    Active,
    /// Timer stopped; host logout calls in flight.
    LoggingOut,
    /// Host acknowledged teardown.
    Closed,
}

/// Result of a logout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Host signalled that the view is closed.
    Acknowledged {
        /// Host calls made before the acknowledgment.
        attempts: u32,
    },
    /// Attempt cap reached without an acknowledgment.
    Unacknowledged {
        /// Host calls made.
        attempts: u32,
    },
    /// A logout was already requested; nothing was done.
    AlreadyRequested,
    /// No host attached; a browser alert was raised instead.
    NoHost,
}

/// Session clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimer {
    started_at: Instant,
    running: bool,
}

impl SessionTimer {
    /// Starts a clock at the current instant.
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
            running: true,
        }
    }

    /// Whole seconds since start.
    pub fn elapsed_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Current label text.
    pub fn label(&self) -> String {
        timer_label(self.elapsed_secs())
    }

    /// Returns `true` until [`Self::stop`] is called.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Marks the clock stopped.
    pub fn stop(&mut self) {
        self.running = false;
    }
}

struct TimerTask {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

struct SessionState {
    phase: SessionPhase,
    timer: Option<SessionTimer>,
    task: Option<TimerTask>,
}

/// Session page controller.
pub struct SessionController {
    host: Option<HostHandle>,
    view: Arc<dyn ViewSurface>,
    policy: LogoutPolicy,
    state: Mutex<SessionState>,
}

impl SessionController {
    /// Creates a controller for a settled readiness gate.
    pub fn new(host: Option<HostHandle>, view: Arc<dyn ViewSurface>, policy: LogoutPolicy) -> Self {
        Self {
            host,
            view,
            policy,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Initializing,
                timer: None,
                task: None,
            }),
        }
    }

    /// Returns `true` when a host handle is attached.
    pub fn is_hosted(&self) -> bool {
        self.host.is_some()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.state
            .lock()
            .map(|state| state.phase)
            .unwrap_or(SessionPhase::Closed)
    }

    /// Snapshot of the session clock, once started.
    pub fn timer(&self) -> Option<SessionTimer> {
        self.state.lock().ok().and_then(|state| state.timer)
    }

    /// Starts the timer, then shows the session user when a host is
    /// attached. Calling it again is a no-op.
    ///
    /// # Errors
    /// Propagates host, payload and view errors from the user lookup; the
    /// timer keeps running regardless.
    pub async fn start(&self) -> Result<Option<HostUser>, SessionError> {
        self.start_timer()?;

        let Some(host) = &self.host else {
            info!("running without host api; session page is inert");
            return Ok(None);
        };

        let user = parse_user(&host.get_user().await?)?;
        self.view.set_text(ElementId::WelcomeHeader, &user.name)?;
        info!(user = %user.name, "session user shown");
        Ok(Some(user))
    }

    fn start_timer(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().map_err(|_| SessionError::Poisoned)?;
        if state.phase != SessionPhase::Initializing {
            return Ok(());
        }

        let timer = SessionTimer::start();
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_timer(self.view.clone(), timer, stop_rx));

        state.timer = Some(timer);
        state.task = Some(TimerTask { stop_tx, join });
        state.phase = SessionPhase::Active;
        debug!("session timer started");
        Ok(())
    }

    async fn stop_timer(&self) {
        let task = match self.state.lock() {
            Ok(mut state) => {
                if let Some(timer) = state.timer.as_mut() {
                    timer.stop();
                }
                state.task.take()
            }
            Err(_) => None,
        };

        if let Some(TimerTask { stop_tx, join }) = task {
            let _ = stop_tx.send(());
            if let Err(error) = join.await {
                warn!(%error, "session timer task ended abnormally");
            }
        }
    }

    fn set_phase(&self, phase: SessionPhase) {
        if let Ok(mut state) = self.state.lock() {
            state.phase = phase;
        }
    }

    /// Ends the session.
    ///
    /// With a host: stops the timer, shows the logged-out text, disables the
    /// report and logout buttons, then calls the host's `logout` once per
    /// interval, without waiting for earlier calls to return, until the host
    /// acknowledges teardown or the policy's attempt cap is reached. Without a
    /// host: raises an alert and leaves the session running.
    ///
    /// # Errors
    /// Returns [`SessionError::Ui`] when the status controls are missing.
    pub async fn logout(&self) -> Result<LogoutOutcome, SessionError> {
        let Some(host) = self.host.clone() else {
            self.view.alert(HOSTLESS_LOGOUT_ALERT);
            return Ok(LogoutOutcome::NoHost);
        };

        {
            let mut state = self.state.lock().map_err(|_| SessionError::Poisoned)?;
            if matches!(state.phase, SessionPhase::LoggingOut | SessionPhase::Closed) {
                return Ok(LogoutOutcome::AlreadyRequested);
            }
            state.phase = SessionPhase::LoggingOut;
        }

        self.stop_timer().await;
        self.view.set_text(ElementId::StatusTimer, LOGGED_OUT_TEXT)?;
        self.view.set_disabled(ElementId::BtnReport, true)?;
        self.view.set_disabled(ElementId::BtnLogout, true)?;
        info!("session timer stopped; requesting host logout");

        let outcome = self.request_host_logout(&host).await;
        if matches!(outcome, LogoutOutcome::Acknowledged { .. }) {
            self.set_phase(SessionPhase::Closed);
        }
        Ok(outcome)
    }

    async fn request_host_logout(&self, host: &HostHandle) -> LogoutOutcome {
        let mut teardown = host.teardown_signal();
        let max_attempts = self.policy.max_attempts;
        // Calls are detached: a host closing the view may never answer one.
        let mut calls = JoinSet::new();

        for attempt in 1..=max_attempts {
            let caller = host.clone();
            calls.spawn(async move { caller.logout().await });

            let acknowledged = match teardown.as_mut() {
                Some(signal) => tokio::select! {
                    biased;
                    () = signal.closed() => true,
                    () = tokio::time::sleep(self.policy.interval) => false,
                },
                None => {
                    tokio::time::sleep(self.policy.interval).await;
                    false
                }
            };
            log_finished_calls(&mut calls);

            if acknowledged {
                info!(attempt, "host acknowledged session teardown");
                return LogoutOutcome::Acknowledged { attempts: attempt };
            }
            debug!(
                attempt,
                in_flight = calls.len(),
                "view still open; retrying host logout"
            );
        }

        warn!(
            attempts = max_attempts,
            in_flight = calls.len(),
            "host logout not acknowledged; giving up"
        );
        LogoutOutcome::Unacknowledged {
            attempts: max_attempts,
        }
    }

    /// Routes one page event.
    ///
    /// # Errors
    /// Propagates handler errors.
    pub async fn handle(&self, event: &UiEvent) -> Result<Option<LogoutOutcome>, SessionError> {
        match event {
            UiEvent::Click {
                target: ElementId::BtnLogout,
            } => self.logout().await.map(Some),
            other => {
                debug!(event = ?other, "session page ignores event");
                Ok(None)
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut()
            && let Some(task) = state.task.take()
        {
            task.join.abort();
        }
    }
}

fn log_finished_calls(calls: &mut JoinSet<Result<(), HostError>>) {
    while let Some(finished) = calls.try_join_next() {
        match finished {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!(%error, "host logout call failed"),
            Err(error) => warn!(%error, "host logout call did not complete"),
        }
    }
}

async fn run_timer(
    view: Arc<dyn ViewSurface>,
    timer: SessionTimer,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(TIMER_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                if let Err(error) = view.set_text(ElementId::StatusTimer, &timer.label()) {
                    warn!(%error, "timer label unavailable; stopping timer");
                    break;
                }
            }
        }
    }
}

/// Session page errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Document access failed.
    #[error("view error: {0}")]
    Ui(#[from] UiError),
    /// Host call failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),
    /// Host returned a malformed record.
    #[error("payload error: {0}")]
    Payload(#[from] CoreError),
    /// Logout policy allows no host calls.
    #[error("logout needs at least one attempt")]
    ZeroLogoutAttempts,
    /// Logout policy has no time between calls.
    #[error("logout interval must be greater than zero")]
    ZeroLogoutInterval,
    /// Controller state lock was poisoned.
    #[error("session state lock poisoned")]
    Poisoned,
}
