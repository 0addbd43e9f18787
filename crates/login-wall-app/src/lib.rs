#![warn(missing_docs)]
//! # login-wall-app
//!
//! ## Purpose
//! Assembles the login wall and session pages from the workspace crates.
//!
//! ## Responsibilities
//! - Load [`AppConfig`] from profile defaults and the environment.
//! - Install structured logging.
//! - Bootstrap each page: readiness gate first, controllers second, loading
//!   overlay last.
//! - Provide [`DemoHost`] so the pages run headless.
//!
//! ## Data flow
//! Shell injects host -> [`bootstrap_login_page`] -> login events -> host
//! opens session -> [`bootstrap_session_page`] -> logout -> host teardown.
//!
//! ## Ownership and lifetimes
//! The slot, view and readiness signal are shared through `Arc`; each page
//! owns its controller.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Initialization failures
//! after the gate settles are logged rather than returned, so a page with a
//! flaky host still accepts input.

mod bootstrap;
mod config;
mod demo;

pub use bootstrap::{
    LoginBootstrap, LoginPage, SessionPage, bootstrap_login_page, bootstrap_session_page,
};
pub use config::{
    AppConfig, ConfigError, DEFAULT_PAGE_URL, ENV_FADE_MS, ENV_LOGOUT_INTERVAL_MS,
    ENV_LOGOUT_MAX_ATTEMPTS, ENV_PAGE_URL, ENV_POLL_ATTEMPTS, ENV_POLL_INTERVAL_MS, ENV_PROFILE,
    ENV_RELOAD_CAP, HostFallback, Profile,
};
pub use demo::{ADMIN_CODE, ADMIN_USER, DESTRUCT_CODE, DemoHost, WallState};

use login_wall_host::HostError;
use login_wall_login::LoginError;
use login_wall_session::SessionError;
use login_wall_ui::UiError;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("LOGIN_WALL_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` filter. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is unusable.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Host boundary failure.
    #[error("host error: {0}")]
    Host(#[from] HostError),
    /// Page template or document failure.
    #[error("view error: {0}")]
    Ui(#[from] UiError),
    /// Login page failure.
    #[error("login error: {0}")]
    Login(#[from] LoginError),
    /// Session page failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}
