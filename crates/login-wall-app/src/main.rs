#![warn(missing_docs)]
//! # login-wall-app binary
//!
//! Headless run of the login wall: the demo host is injected after page load,
//! the admin code is typed and submitted, the session page opens, and the
//! session is logged out.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use login_wall_app::{
    ADMIN_CODE, AppConfig, AppError, DemoHost, LoginBootstrap, WallState, app_version,
    bootstrap_login_page, bootstrap_session_page, init_logging,
};
use login_wall_core::HostDetails;
use login_wall_gate::ReadinessSignal;
use login_wall_host::HostSlot;
use login_wall_ui::{ENTER_KEY, ElementId, MemoryView, UiEvent, ViewSurface};
use tracing::{error, info, warn};

const SESSION_DEMO_LENGTH: Duration = Duration::from_secs(3);
const HOST_ANSWER_TIMEOUT: Duration = Duration::from_secs(5);

/// CLI entry point.
#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "login wall run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    info!(version = app_version(), profile = ?config.profile, "starting login wall");

    let host = Arc::new(DemoHost::new(
        DemoHost::local_pc_name(),
        HostDetails {
            version: Some(app_version().to_string()),
            updated: None,
        },
    ));
    let slot = Arc::new(HostSlot::new());

    // The shell injects its API some time after the page has loaded.
    let injection_delay = config.gate.interval().saturating_mul(2);
    {
        let slot = slot.clone();
        let host = host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(injection_delay).await;
            if let Err(error) = slot.inject(host) {
                warn!(%error, "host injection rejected");
            }
        });
    }

    let login_view = Arc::new(MemoryView::login_page());
    let login_page = match bootstrap_login_page(
        &config,
        slot.clone(),
        login_view.clone(),
        Arc::new(ReadinessSignal::new()),
    )
    .await?
    {
        LoginBootstrap::Ready(page) => page,
        LoginBootstrap::Reload(url) => {
            info!(%url, "host missing; page would reload");
            return Ok(());
        }
    };
    info!(pc_name = %login_view.text(ElementId::PcName)?, "login wall shown");

    let mut typed = String::new();
    for ch in ADMIN_CODE.chars() {
        typed.push(ch);
        login_view.set_input_value(ElementId::IdInput, &typed)?;
        login_page
            .handle(&UiEvent::Input {
                target: ElementId::IdInput,
            })
            .await?;
    }
    let mut wall = host.watch_state();
    login_page.handle(&UiEvent::key(ENTER_KEY)).await?;

    // The host answers the login call on its own schedule.
    let answered = tokio::time::timeout(
        HOST_ANSWER_TIMEOUT,
        wall.wait_for(|state| *state != WallState::Locked),
    )
    .await
    .is_ok_and(|changed| changed.is_ok());
    if !answered || !matches!(host.state(), WallState::SessionOpen { .. }) {
        warn!(state = ?host.state(), "no session opened");
        return Ok(());
    }

    let session_view = Arc::new(MemoryView::session_page());
    let session_page = bootstrap_session_page(
        &config,
        slot,
        session_view.clone(),
        Arc::new(ReadinessSignal::new()),
    )
    .await?;
    info!(user = %session_view.text(ElementId::WelcomeHeader)?, "session page shown");

    tokio::time::sleep(SESSION_DEMO_LENGTH).await;
    info!(timer = %session_view.text(ElementId::StatusTimer)?, "logging out");

    let outcome = session_page
        .handle(&UiEvent::Click {
            target: ElementId::BtnLogout,
        })
        .await?;
    info!(
        ?outcome,
        status = %session_view.text(ElementId::StatusTimer)?,
        state = ?host.state(),
        "session finished"
    );
    Ok(())
}
