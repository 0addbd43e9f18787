//! Shared fixtures for app integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use login_wall_app::{AppConfig, DEFAULT_PAGE_URL, Profile};
use login_wall_core::{MessageBoxButtons, MessageBoxIcon, MessageBoxResult};
use login_wall_host::{
    HostApi, HostError, HostSlot, TeardownNotifier, TeardownSignal, teardown_channel,
};
use url::Url;

/// Host double that records calls and answers with canned payloads.
pub struct FakeHost {
    pub details: String,
    pub user: String,
    pub codes: Mutex<Vec<String>>,
    pub logouts: AtomicU32,
    teardown: Option<TeardownNotifier>,
}

impl FakeHost {
    /// Host with a teardown channel that closes on the first logout call.
    #[allow(dead_code)]
    pub fn new() -> Self {
        let (notifier, _) = teardown_channel();
        Self {
            details: r#"{"version":"1.2","updated":"2024-01-01"}"#.to_string(),
            user: r#"{"name":"Admin"}"#.to_string(),
            codes: Mutex::new(Vec::new()),
            logouts: AtomicU32::new(0),
            teardown: Some(notifier),
        }
    }

    /// Same host without a teardown channel.
    #[allow(dead_code)]
    pub fn without_teardown() -> Self {
        Self {
            teardown: None,
            ..Self::new()
        }
    }

    /// Replaces the `get_details` payload.
    #[allow(dead_code)]
    pub fn with_details(mut self, details: &str) -> Self {
        self.details = details.to_string();
        self
    }

    /// Replaces the `get_user` payload.
    #[allow(dead_code)]
    pub fn with_user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    /// Codes received through `validate_login`.
    #[allow(dead_code)]
    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().expect("codes lock should work").clone()
    }
}

#[async_trait]
impl HostApi for FakeHost {
    async fn get_pc_name(&self) -> Result<String, HostError> {
        Ok("KIOSK-07".to_string())
    }

    async fn get_details(&self) -> Result<String, HostError> {
        Ok(self.details.clone())
    }

    async fn get_user(&self) -> Result<String, HostError> {
        Ok(self.user.clone())
    }

    async fn validate_login(&self, code: &str) -> Result<(), HostError> {
        self.codes
            .lock()
            .expect("codes lock should work")
            .push(code.to_string());
        Ok(())
    }

    async fn logout(&self) -> Result<(), HostError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        if let Some(notifier) = &self.teardown {
            notifier.signal();
        }
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

    fn teardown_signal(&self) -> Option<TeardownSignal> {
        self.teardown.as_ref().map(TeardownNotifier::subscribe)
    }
}

/// Profile defaults with the default page URL.
#[allow(dead_code)]
pub fn config(profile: Profile) -> AppConfig {
    let url = Url::parse(DEFAULT_PAGE_URL).expect("default page url should parse");
    AppConfig::for_profile(profile, url).expect("profile defaults should be valid")
}

/// Slot already holding `host`.
#[allow(dead_code)]
pub fn hosted_slot(host: Arc<FakeHost>) -> Arc<HostSlot> {
    let slot = Arc::new(HostSlot::new());
    slot.inject(host).expect("injection should work");
    slot
}
