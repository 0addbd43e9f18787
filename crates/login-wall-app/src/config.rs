//! Runtime configuration: build profile defaults plus environment overrides.

use std::str::FromStr;
use std::time::Duration;

use login_wall_gate::{GateConfig, ReloadPolicy};
use login_wall_session::{LogoutPolicy, SessionError};
use thiserror::Error;
use url::Url;

/// Selects the profile defaults.
pub const ENV_PROFILE: &str = "LOGIN_WALL_PROFILE";
/// Overrides the readiness poll attempt count.
pub const ENV_POLL_ATTEMPTS: &str = "LOGIN_WALL_POLL_ATTEMPTS";
/// Overrides the readiness poll interval in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "LOGIN_WALL_POLL_INTERVAL_MS";
/// Overrides the loading overlay fade in milliseconds.
pub const ENV_FADE_MS: &str = "LOGIN_WALL_FADE_MS";
/// Overrides the spacing of host logout calls in milliseconds.
pub const ENV_LOGOUT_INTERVAL_MS: &str = "LOGIN_WALL_LOGOUT_INTERVAL_MS";
/// Overrides the host logout call cap.
pub const ENV_LOGOUT_MAX_ATTEMPTS: &str = "LOGIN_WALL_LOGOUT_MAX_ATTEMPTS";
/// Overrides the page reload cap.
pub const ENV_RELOAD_CAP: &str = "LOGIN_WALL_RELOAD_CAP";
/// Overrides the URL of the login page.
pub const ENV_PAGE_URL: &str = "LOGIN_WALL_PAGE_URL";

/// Login page URL used when none is configured.
pub const DEFAULT_PAGE_URL: &str = "file:///login-wall/web/login/index.html";

/// Build flavour of the page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Development tree: fast poll, reloads when the host is missing.
    Testing,
    /// Shipped tree: slower poll, browser fallback, version labels filled.
    Dist,
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "testing" => Ok(Self::Testing),
            "dist" => Ok(Self::Dist),
            other => Err(ConfigError::Invalid {
                key: ENV_PROFILE,
                reason: format!("unknown profile {other:?}"),
            }),
        }
    }
}

/// What the login page does when the host never appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFallback {
    /// Reload the page, bounded by [`ReloadPolicy`], then fall back to
    /// browser mode.
    Reload,
    /// Stay on the page with inert controllers.
    Browser,
}

/// Complete page configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Profile the defaults came from.
    pub profile: Profile,
    /// Readiness poll schedule.
    pub gate: GateConfig,
    /// Loading overlay fade transition.
    pub fade: Duration,
    /// Login page behaviour on gate exhaustion.
    pub fallback: HostFallback,
    /// Whether the login page fills the version labels.
    pub populate_details: bool,
    /// Reload cap for [`HostFallback::Reload`].
    pub reload: ReloadPolicy,
    /// Host logout retry schedule.
    pub logout: LogoutPolicy,
    /// URL of the login page, carrying the reload counter.
    pub page_url: Url,
}

impl AppConfig {
    /// Defaults for `profile`, serving the login page at `page_url`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a profile schedule fails
    /// validation.
    pub fn for_profile(profile: Profile, page_url: Url) -> Result<Self, ConfigError> {
        let (interval_ms, fallback, populate_details) = match profile {
            Profile::Testing => (50, HostFallback::Reload, false),
            Profile::Dist => (100, HostFallback::Browser, true),
        };
        let gate = GateConfig::new(5, Duration::from_millis(interval_ms))
            .map_err(|error| invalid(ENV_POLL_INTERVAL_MS, error))?;

        Ok(Self {
            profile,
            gate,
            fade: login_wall_ui::DEFAULT_FADE,
            fallback,
            populate_details,
            reload: ReloadPolicy::default(),
            logout: LogoutPolicy::default(),
            page_url,
        })
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// See [`Self::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, starting from the selected
    /// profile's defaults. Unset keys keep the default.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for unparsable or out-of-range values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let profile = match lookup(ENV_PROFILE) {
            Some(value) => value.parse()?,
            None => Profile::Testing,
        };
        let raw_url = lookup(ENV_PAGE_URL).unwrap_or_else(|| DEFAULT_PAGE_URL.to_string());
        let page_url = Url::parse(raw_url.trim()).map_err(|error| ConfigError::Invalid {
            key: ENV_PAGE_URL,
            reason: error.to_string(),
        })?;
        let mut config = Self::for_profile(profile, page_url)?;

        let max_attempts =
            parse_number(&lookup, ENV_POLL_ATTEMPTS)?.unwrap_or(config.gate.max_attempts());
        let interval =
            parse_millis(&lookup, ENV_POLL_INTERVAL_MS)?.unwrap_or(config.gate.interval());
        config.gate = GateConfig::new(max_attempts, interval)
            .map_err(|error| invalid(ENV_POLL_INTERVAL_MS, error))?;

        if let Some(fade) = parse_millis(&lookup, ENV_FADE_MS)? {
            config.fade = fade;
        }

        let logout_interval =
            parse_millis(&lookup, ENV_LOGOUT_INTERVAL_MS)?.unwrap_or(config.logout.interval());
        let logout_attempts = parse_number(&lookup, ENV_LOGOUT_MAX_ATTEMPTS)?
            .unwrap_or(config.logout.max_attempts());
        config.logout =
            LogoutPolicy::new(logout_interval, logout_attempts).map_err(|error| match error {
                SessionError::ZeroLogoutInterval => invalid(ENV_LOGOUT_INTERVAL_MS, error),
                other => invalid(ENV_LOGOUT_MAX_ATTEMPTS, other),
            })?;

        if let Some(cap) = parse_number(&lookup, ENV_RELOAD_CAP)? {
            config.reload = ReloadPolicy { cap };
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, error: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: error.to_string(),
    }
}

fn parse_number(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u32>, ConfigError> {
    lookup(key)
        .map(|value| {
            value.trim().parse::<u32>().map_err(|error| ConfigError::Invalid {
                key,
                reason: format!("{value:?}: {error}"),
            })
        })
        .transpose()
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    Ok(parse_number(lookup, key)?.map(|ms| Duration::from_millis(u64::from(ms))))
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds an unusable value.
    #[error("invalid {key}: {reason}")]
    Invalid {
        /// Offending variable.
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}
