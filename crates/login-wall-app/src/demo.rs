//! In-process stand-in for the desktop shell, used by the headless binary.
//!
//! Mirrors what the kiosk shell does with each call: a known admin code
//! opens a session, the destruct code tears the wall down, anything else
//! pops a "not found" dialog.

use std::sync::Mutex;

use async_trait::async_trait;
use login_wall_core::{HostDetails, HostUser, MessageBoxButtons, MessageBoxIcon, MessageBoxResult};
use login_wall_host::{HostApi, HostError, TeardownNotifier, TeardownSignal, teardown_channel};
use tokio::sync::watch;
use tracing::{info, warn};

/// Code that opens an administrator session.
pub const ADMIN_CODE: &str = "iamadmin";

/// Code that shuts the login wall down for good.
pub const DESTRUCT_CODE: &str = "destruct";

/// Display name of the administrator session.
pub const ADMIN_USER: &str = "Admin";

/// Shell-side lifecycle of the demo host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallState {
    /// Login wall is showing.
    Locked,
    /// A session page is open for `user`.
    SessionOpen {
        /// Session user name.
        user: String,
    },
    /// The session view was closed by logout.
    LoggedOut,
    /// The wall was torn down by the destruct code.
    Destructed,
}

/// Scripted host for headless runs and demos.
pub struct DemoHost {
    pc_name: String,
    details: HostDetails,
    state: watch::Sender<WallState>,
    teardown: TeardownNotifier,
    messages: Mutex<Vec<String>>,
}

impl DemoHost {
    /// Creates a host reporting `pc_name` and `details`.
    pub fn new(pc_name: impl Into<String>, details: HostDetails) -> Self {
        let (state, _) = watch::channel(WallState::Locked);
        let (teardown, _) = teardown_channel();
        Self {
            pc_name: pc_name.into(),
            details,
            state,
            teardown,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Machine name from `COMPUTERNAME` or `HOSTNAME`.
    pub fn local_pc_name() -> String {
        std::env::var("COMPUTERNAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_else(|_| "kiosk".to_string())
    }

    /// Current shell state.
    pub fn state(&self) -> WallState {
        self.state.borrow().clone()
    }

    /// Subscribes to shell state changes.
    pub fn watch_state(&self) -> watch::Receiver<WallState> {
        self.state.subscribe()
    }

    /// Texts of the dialogs shown so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    fn session_user(&self) -> Option<String> {
        match &*self.state.borrow() {
            WallState::SessionOpen { user } => Some(user.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl HostApi for DemoHost {
    async fn get_pc_name(&self) -> Result<String, HostError> {
        Ok(self.pc_name.clone())
    }

    async fn get_details(&self) -> Result<String, HostError> {
        serde_json::to_string(&self.details).map_err(|error| HostError::Call(error.to_string()))
    }

    async fn get_user(&self) -> Result<String, HostError> {
        let name = self
            .session_user()
            .ok_or_else(|| HostError::Call("no open session".to_string()))?;
        serde_json::to_string(&HostUser { name }).map_err(|error| HostError::Call(error.to_string()))
    }

    async fn validate_login(&self, code: &str) -> Result<(), HostError> {
        match code {
            DESTRUCT_CODE => {
                info!("destruct code received; closing wall");
                self.state.send_replace(WallState::Destructed);
            }
            ADMIN_CODE => {
                info!(user = ADMIN_USER, "login accepted; opening session");
                self.state.send_replace(WallState::SessionOpen {
                    user: ADMIN_USER.to_string(),
                });
            }
            _ => {
                self.show_message(
                    "Student ID not found!",
                    "Not Found",
                    MessageBoxButtons::Ok,
                    MessageBoxIcon::Warning,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), HostError> {
        if self.teardown.is_signalled() {
            return Ok(());
        }
        info!("closing session view");
        self.state.send_replace(WallState::LoggedOut);
        self.teardown.signal();
        Ok(())
    }

    async fn show_message(
        &self,
        text: &str,
        title: &str,
        buttons: MessageBoxButtons,
        icon: MessageBoxIcon,
    ) -> Result<MessageBoxResult, HostError> {
        warn!(
            title,
            text,
            flags = buttons.code() | icon.code(),
            "host dialog"
        );
        self.messages
            .lock()
            .map_err(|_| HostError::Call("dialog log poisoned".to_string()))?
            .push(text.to_string());
        Ok(MessageBoxResult::Ok)
    }

    fn teardown_signal(&self) -> Option<TeardownSignal> {
        Some(self.teardown.subscribe())
    }
}
