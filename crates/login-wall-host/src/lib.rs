#![warn(missing_docs)]
//! # login-wall-host
//!
//! ## Purpose
//! Models the boundary to the desktop shell that hosts the login wall.
//!
//! ## Responsibilities
//! - Declare the host operations the pages consume ([`HostApi`]).
//! - Provide the write-once slot the shell injects its handle into
//!   ([`HostSlot`]).
//! - Provide an optional teardown acknowledgment channel so logout can stop
//!   retrying once the host has closed the view.
//!
//! ## Data flow
//! Shell -> [`HostSlot::inject`] -> readiness gate observes the slot ->
//! controllers receive a [`HostHandle`] and call it.
//!
//! ## Ownership and lifetimes
//! The handle is shared as `Arc<dyn HostApi>`: written once, read by every
//! controller for the lifetime of the page.
//!
//! ## Error model
//! Host-side failures are opaque and surface as [`HostError::Call`].

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use login_wall_core::{MessageBoxButtons, MessageBoxIcon, MessageBoxResult};
use thiserror::Error;
use tokio::sync::watch;

/// Shared handle to the injected host API.
pub type HostHandle = Arc<dyn HostApi>;

/// Operations exposed by the desktop shell to the page.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Returns the machine name shown on the login wall.
    async fn get_pc_name(&self) -> Result<String, HostError>;

    /// Returns the `{version, updated}` JSON record.
    async fn get_details(&self) -> Result<String, HostError>;

    /// Returns the `{name}` JSON record of the session user.
    async fn get_user(&self) -> Result<String, HostError>;

    /// Hands a submitted login code to the host. Validation is entirely the
    /// host's responsibility.
    async fn validate_login(&self, code: &str) -> Result<(), HostError>;

    /// Asks the host to end the session and close the view.
    async fn logout(&self) -> Result<(), HostError>;

    /// Shows a native message dialog and returns the pressed button.
    async fn show_message(
        &self,
        text: &str,
        title: &str,
        buttons: MessageBoxButtons,
        icon: MessageBoxIcon,
    ) -> Result<MessageBoxResult, HostError>;

    /// Teardown acknowledgment channel, when the host provides one.
    fn teardown_signal(&self) -> Option<TeardownSignal> {
        None
    }
}

/// Page-global slot the host injects its API into.
///
/// The slot is write-once; later injections are rejected.
#[derive(Default)]
pub struct HostSlot {
    handle: OnceLock<HostHandle>,
}

impl HostSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the host handle.
    ///
    /// # Errors
    /// Returns [`HostError::AlreadyInjected`] when a handle is already present.
    pub fn inject(&self, handle: HostHandle) -> Result<(), HostError> {
        self.handle
            .set(handle)
            .map_err(|_| HostError::AlreadyInjected)
    }

    /// Returns the handle if the host has injected it.
    pub fn get(&self) -> Option<HostHandle> {
        self.handle.get().cloned()
    }

    /// Returns `true` once the host has injected its handle.
    pub fn is_injected(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl std::fmt::Debug for HostSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSlot")
            .field("injected", &self.is_injected())
            .finish()
    }
}

/// Host side of the teardown channel.
#[derive(Debug)]
pub struct TeardownNotifier {
    tx: watch::Sender<bool>,
}

impl TeardownNotifier {
    /// Marks the view as closed. Idempotent.
    pub fn signal(&self) {
        self.tx.send_replace(true);
    }

    /// Returns a page-side receiver.
    pub fn subscribe(&self) -> TeardownSignal {
        TeardownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns `true` once [`Self::signal`] has been called.
    pub fn is_signalled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Page side of the teardown channel.
#[derive(Debug, Clone)]
pub struct TeardownSignal {
    rx: watch::Receiver<bool>,
}

impl TeardownSignal {
    /// Completes once the host has closed the view.
    ///
    /// A dropped notifier counts as closed: the host is gone.
    pub async fn closed(&mut self) {
        let _ = self.rx.wait_for(|closed| *closed).await;
    }

    /// Non-blocking check of the teardown flag.
    pub fn is_closed(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}

/// Creates a linked notifier/signal pair.
pub fn teardown_channel() -> (TeardownNotifier, TeardownSignal) {
    let (tx, rx) = watch::channel(false);
    (TeardownNotifier { tx }, TeardownSignal { rx })
}

/// Errors produced at the host boundary.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host call failed; details are host-defined.
    #[error("host call failed: {0}")]
    Call(String),
    /// The slot already holds a handle.
    #[error("host handle already injected")]
    AlreadyInjected,
}

#[cfg(test)]
mod tests {
    //! Unit tests for the injection slot and teardown channel.

    use super::*;

    struct NullHost;

    #[async_trait]
    impl HostApi for NullHost {
        async fn get_pc_name(&self) -> Result<String, HostError> {
            Ok("pc".to_string())
        }

        async fn get_details(&self) -> Result<String, HostError> {
            Ok("{}".to_string())
        }

        async fn get_user(&self) -> Result<String, HostError> {
            Ok(r#"{"name":"n"}"#.to_string())
        }

        async fn validate_login(&self, _code: &str) -> Result<(), HostError> {
            Ok(())
        }

        async fn logout(&self) -> Result<(), HostError> {
            Ok(())
        }

        async fn show_message(
            &self,
            _text: &str,
            _title: &str,
            _buttons: MessageBoxButtons,
            _icon: MessageBoxIcon,
        ) -> Result<MessageBoxResult, HostError> {
            Ok(MessageBoxResult::Ok)
        }
    }

    #[test]
    fn slot_accepts_one_injection() {
        let slot = HostSlot::new();
        assert!(slot.get().is_none());

        slot.inject(Arc::new(NullHost)).expect("first injection should work");
        assert!(slot.is_injected());
        assert!(matches!(
            slot.inject(Arc::new(NullHost)),
            Err(HostError::AlreadyInjected)
        ));
    }

    #[tokio::test]
    async fn teardown_signal_completes_after_notify() {
        let (notifier, mut signal) = teardown_channel();
        assert!(!signal.is_closed());

        notifier.signal();
        signal.closed().await;
        assert!(signal.is_closed());
        assert!(notifier.is_signalled());
    }

    #[tokio::test]
    async fn dropped_notifier_counts_as_closed() {
        let (notifier, mut signal) = teardown_channel();
        drop(notifier);
        signal.closed().await;
        assert!(signal.is_closed());
    }
}
