#![warn(missing_docs)]
//! # login-wall-login
//!
//! ## Purpose
//! Drives the login wall page: code entry, masking, and the header labels.
//!
//! ## Responsibilities
//! - Submit the login field on Enter and always clear it afterwards.
//! - Mask the field whenever its value holds a non-digit character.
//! - Show the machine name and, when enabled, the version/updated labels.
//!
//! ## Data flow
//! [`UiEvent`] -> [`LoginController::handle`] -> host `validate_login` ->
//! field cleared. Host details -> [`login_wall_core::parse_details`] ->
//! labels.
//!
//! ## Ownership and lifetimes
//! The controller holds the settled host handle (or `None` in browser mode)
//! and a shared view; it is constructed only after the readiness gate
//! settles.
//!
//! ## Error model
//! View and payload failures propagate as [`LoginError`]. The field is
//! cleared before `validate_login` runs; the call itself is detached and a
//! failure is only logged.
//!
//! ## Security and privacy notes
//! Submitted codes are never logged verbatim; see [`redact_code`].

use std::sync::Arc;

use login_wall_core::{CoreError, HostDetails, InputMode, parse_details};
use login_wall_host::{HostError, HostHandle};
use login_wall_ui::{ENTER_KEY, ElementId, KeyDisposition, UiError, UiEvent, ViewSurface};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What happened to a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSubmission {
    /// The code was handed to the host.
    Forwarded,
    /// No host is attached; the submission was only logged.
    NoHost,
}

/// Login wall controller.
pub struct LoginController {
    host: Option<HostHandle>,
    view: Arc<dyn ViewSurface>,
}

impl LoginController {
    /// Creates a controller for a settled readiness gate.
    pub fn new(host: Option<HostHandle>, view: Arc<dyn ViewSurface>) -> Self {
        Self { host, view }
    }

    /// Returns `true` when a host handle is attached.
    pub fn is_hosted(&self) -> bool {
        self.host.is_some()
    }

    /// Fills the machine name and, when `populate_details` is set, the
    /// version labels. Does nothing without a host.
    ///
    /// # Errors
    /// Propagates host, payload and view errors.
    pub async fn initialize(&self, populate_details: bool) -> Result<(), LoginError> {
        let Some(host) = &self.host else {
            info!("running without host api; login wall is inert");
            return Ok(());
        };

        let pc_name = host.get_pc_name().await?;
        self.view.set_text(ElementId::PcName, &pc_name)?;
        debug!(pc_name = %pc_name, "pc name shown");

        if populate_details {
            self.refresh_details().await?;
        }
        Ok(())
    }

    /// Re-reads `{version, updated}` from the host into the labels.
    ///
    /// A key absent from the payload leaves its label unchanged.
    ///
    /// # Errors
    /// Returns [`LoginError::Payload`] for malformed details; host and view
    /// errors propagate.
    pub async fn refresh_details(&self) -> Result<HostDetails, LoginError> {
        let Some(host) = &self.host else {
            debug!("details refresh skipped: no host api");
            return Ok(HostDetails::default());
        };

        let details = parse_details(&host.get_details().await?)?;
        if let Some(version) = &details.version {
            self.view.set_text(ElementId::LblVersion, version)?;
        }
        if let Some(updated) = &details.updated {
            self.view.set_text(ElementId::LblUpdated, updated)?;
        }
        Ok(details)
    }

    /// Applies the masking rule to the field's current value.
    ///
    /// # Errors
    /// Returns [`LoginError::Ui`] when the field is missing.
    pub fn on_input(&self) -> Result<InputMode, LoginError> {
        let value = self.view.input_value(ElementId::IdInput)?;
        let mode = InputMode::for_value(&value);
        if self.view.input_mode(ElementId::IdInput)? != mode {
            self.view.set_input_mode(ElementId::IdInput, mode)?;
        }
        Ok(mode)
    }

    /// Document key handler; Enter submits.
    ///
    /// # Errors
    /// Propagates errors from [`Self::login`].
    pub async fn on_key(&self, key: &str) -> Result<KeyDisposition, LoginError> {
        if key != ENTER_KEY {
            return Ok(KeyDisposition::Ignored);
        }
        self.login().await?;
        Ok(KeyDisposition::Handled)
    }

    /// Clears the field and hands its value to the host.
    ///
    /// The field is cleared and re-masked before the host sees the code. The
    /// host call runs detached: its verdict is not visible to the page, and a
    /// call that never returns cannot hold up the key handler.
    ///
    /// # Errors
    /// Returns [`LoginError::Ui`] when the field is missing.
    pub async fn login(&self) -> Result<LoginSubmission, LoginError> {
        let code = self.view.input_value(ElementId::IdInput)?;
        self.view.set_input_value(ElementId::IdInput, "")?;
        self.on_input()?;

        let redacted = redact_code(&code);
        let Some(host) = self.host.clone() else {
            info!(code = %redacted, "login submitted without host api");
            return Ok(LoginSubmission::NoHost);
        };

        tokio::spawn(async move {
            match host.validate_login(&code).await {
                Ok(()) => info!(code = %redacted, "host returned from validate_login"),
                Err(error) => warn!(code = %redacted, %error, "host validate_login failed"),
            }
        });
        Ok(LoginSubmission::Forwarded)
    }

    /// Routes one page event.
    ///
    /// # Errors
    /// Propagates handler errors.
    pub async fn handle(&self, event: &UiEvent) -> Result<KeyDisposition, LoginError> {
        match event {
            UiEvent::KeyDown { key } => self.on_key(key).await,
            UiEvent::Input {
                target: ElementId::IdInput,
            } => {
                self.on_input()?;
                Ok(KeyDisposition::Ignored)
            }
            UiEvent::Click {
                target: ElementId::BtnRefresh,
            } => {
                self.refresh_details().await?;
                Ok(KeyDisposition::Ignored)
            }
            other => {
                debug!(event = ?other, "login page ignores event");
                Ok(KeyDisposition::Ignored)
            }
        }
    }
}

/// Renders a login code for logs without revealing it.
pub fn redact_code(code: &str) -> String {
    format!("<redacted:{} chars>", code.chars().count())
}

/// Login page errors.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Document access failed.
    #[error("view error: {0}")]
    Ui(#[from] UiError),
    /// Host call failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),
    /// Host returned a malformed record.
    #[error("payload error: {0}")]
    Payload(#[from] CoreError),
}
