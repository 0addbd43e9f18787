//! Page bootstrap: settle the readiness gate, then wire the controllers.
//!
//! Controllers are only constructed from a settled [`GateOutcome`], so no
//! event handler can observe a handle that is still pending.

use std::sync::Arc;
use std::time::Duration;

use login_wall_gate::{GateOutcome, ReadinessGate, ReadinessSignal};
use login_wall_host::HostSlot;
use login_wall_login::LoginController;
use login_wall_session::{LogoutOutcome, SessionController};
use login_wall_ui::{ElementId, KeyDisposition, UiError, UiEvent, ViewSurface, fade_out};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

use crate::AppError;
use crate::config::{AppConfig, HostFallback};

const LOGIN_REQUIRED: &[ElementId] = &[ElementId::IdInput];

const SESSION_REQUIRED: &[ElementId] = &[
    ElementId::StatusTimer,
    ElementId::BtnReport,
    ElementId::BtnLogout,
];

fn require_elements(view: &dyn ViewSurface, ids: &[ElementId]) -> Result<(), UiError> {
    match ids.iter().find(|id| !view.has_element(**id)) {
        Some(missing) => Err(UiError::MissingElement(*missing)),
        None => Ok(()),
    }
}

// Events are routed while the overlay is still fading.
fn spawn_overlay_fade(view: Arc<dyn ViewSurface>, transition: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        fade_out(view.as_ref(), ElementId::LoadingScreen, transition).await;
    })
}

/// Result of bootstrapping the login page.
pub enum LoginBootstrap {
    /// Page is wired and interactive.
    Ready(LoginPage),
    /// The host never appeared; the shell should navigate to this URL.
    Reload(Url),
}

/// Wired login page.
pub struct LoginPage {
    controller: LoginController,
    outcome: GateOutcome,
    overlay: JoinHandle<()>,
}

impl LoginPage {
    /// Returns `true` once the loading overlay has faded and been removed.
    pub fn overlay_gone(&self) -> bool {
        self.overlay.is_finished()
    }

    /// Login controller.
    pub fn controller(&self) -> &LoginController {
        &self.controller
    }

    /// How the readiness gate settled.
    pub fn outcome(&self) -> &GateOutcome {
        &self.outcome
    }

    /// Dispatches a page event.
    ///
    /// # Errors
    /// Propagates controller errors.
    pub async fn handle(&self, event: &UiEvent) -> Result<KeyDisposition, AppError> {
        Ok(self.controller.handle(event).await?)
    }
}

/// Wired session page.
pub struct SessionPage {
    controller: SessionController,
    outcome: GateOutcome,
    overlay: JoinHandle<()>,
}

impl SessionPage {
    /// Returns `true` once the loading overlay has faded and been removed.
    pub fn overlay_gone(&self) -> bool {
        self.overlay.is_finished()
    }

    /// Session controller.
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// How the readiness gate settled.
    pub fn outcome(&self) -> &GateOutcome {
        &self.outcome
    }

    /// Dispatches a page event.
    ///
    /// # Errors
    /// Propagates controller errors.
    pub async fn handle(&self, event: &UiEvent) -> Result<Option<LogoutOutcome>, AppError> {
        Ok(self.controller.handle(event).await?)
    }
}

/// Boots the login wall.
///
/// Waits for the host, fills the header labels, and starts fading the
/// loading overlay. The page is returned without waiting for the fade.
/// When the host never appears, either requests a capped reload or
/// stays in browser mode, per [`AppConfig::fallback`].
///
/// # Errors
/// Returns [`AppError::Ui`] when the template lacks the login field.
/// Initialization failures (host calls, malformed details) are logged and
/// the page stays usable.
pub async fn bootstrap_login_page(
    config: &AppConfig,
    slot: Arc<HostSlot>,
    view: Arc<dyn ViewSurface>,
    signal: Arc<ReadinessSignal>,
) -> Result<LoginBootstrap, AppError> {
    require_elements(view.as_ref(), LOGIN_REQUIRED)?;
    let gate = ReadinessGate::with_signal(slot, config.gate, signal);
    let outcome = gate.wait().await;

    if !outcome.is_ready() && config.fallback == HostFallback::Reload {
        if let Some(url) = config.reload.next_reload(&config.page_url) {
            return Ok(LoginBootstrap::Reload(url));
        }
        warn!("reload cap reached; continuing in browser mode");
    }

    let controller = LoginController::new(outcome.handle(), view.clone());
    if let Err(error) = controller.initialize(config.populate_details).await {
        error!(%error, "login page initialization failed");
    }
    let overlay = spawn_overlay_fade(view, config.fade);
    info!(hosted = controller.is_hosted(), "login page ready");

    Ok(LoginBootstrap::Ready(LoginPage {
        controller,
        outcome,
        overlay,
    }))
}

/// Boots the session page.
///
/// Waits for the host, starts the session timer, shows the user, and starts
/// fading the loading overlay. The session page never reloads.
///
/// # Errors
/// Returns [`AppError::Ui`] when the template lacks the timer label or the
/// logout controls. Initialization failures are logged and the timer keeps
/// running.
pub async fn bootstrap_session_page(
    config: &AppConfig,
    slot: Arc<HostSlot>,
    view: Arc<dyn ViewSurface>,
    signal: Arc<ReadinessSignal>,
) -> Result<SessionPage, AppError> {
    require_elements(view.as_ref(), SESSION_REQUIRED)?;
    let gate = ReadinessGate::with_signal(slot, config.gate, signal);
    let outcome = gate.wait().await;

    let controller = SessionController::new(outcome.handle(), view.clone(), config.logout);
    if let Err(error) = controller.start().await {
        error!(%error, "session page initialization failed");
    }
    let overlay = spawn_overlay_fade(view, config.fade);
    info!(hosted = controller.is_hosted(), "session page ready");

    Ok(SessionPage {
        controller,
        outcome,
        overlay,
    })
}
