#![warn(missing_docs)]
//! # login-wall-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `login-wall` workspace.
//!
//! ## Responsibilities
//! - Parse the JSON records returned by the host (`get_details`, `get_user`).
//! - Decide the display mode of the login field from its current value.
//! - Format elapsed session time into the `Xh Ym Zs` label.
//! - Carry the numeric codes of the host's native message dialog.
//!
//! ## Data flow
//! Host strings -> [`parse_details`] / [`parse_user`] -> controllers write the
//! owned values into the view. Session clock seconds -> [`format_elapsed`] ->
//! timer label.
//!
//! ## Ownership and lifetimes
//! Parsed records own their strings so they can outlive the transient host
//! response buffers.
//!
//! ## Error model
//! Malformed host payloads return [`CoreError::MalformedPayload`]; nothing in
//! this crate recovers from them, callers decide whether to log or abort.
//!
//! ## Example
//! ```rust
//! use login_wall_core::{format_elapsed, InputMode};
//!
//! assert_eq!(format_elapsed(3_725), "1h 2m 5s");
//! assert_eq!(InputMode::for_value("12a"), InputMode::Password);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of the live session timer label.
pub const TIMER_LABEL_PREFIX: &str = "Logged in: ";

/// Text shown in the timer label once logout has started.
pub const LOGGED_OUT_TEXT: &str = "You have successfully logged out!";

/// Build metadata reported by the host through `get_details`.
///
/// Both keys are optional on the wire; a missing key leaves the matching
/// label untouched. Unknown keys are omitted when serializing, never sent as
/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDetails {
    /// Installed application version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Date of the last update, as the host formats it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// Current session user reported by the host through `get_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    /// Display name shown in the welcome header.
    pub name: String,
}

/// Parses the raw `get_details` JSON string.
///
/// # Errors
/// Returns [`CoreError::MalformedPayload`] when the string is not a JSON
/// object or a present key is not a string.
pub fn parse_details(raw: &str) -> Result<HostDetails, CoreError> {
    serde_json::from_str(raw).map_err(|source| CoreError::MalformedPayload {
        record: "details",
        source,
    })
}

/// Parses the raw `get_user` JSON string.
///
/// # Errors
/// Returns [`CoreError::MalformedPayload`] when the string is not a JSON
/// object with a string `name`.
pub fn parse_user(raw: &str) -> Result<HostUser, CoreError> {
    serde_json::from_str(raw).map_err(|source| CoreError::MalformedPayload {
        record: "user",
        source,
    })
}

/// Display mode of the login input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Plain text, used while the value is digits only.
    Text,
    /// Masked, used once any non-digit character is present.
    Password,
}

impl InputMode {
    /// Returns the mode the field must use for `value`.
    ///
    /// Only ASCII `0-9` count as digits. An empty value is plain text.
    pub fn for_value(value: &str) -> Self {
        if value.chars().any(|ch| !ch.is_ascii_digit()) {
            Self::Password
        } else {
            Self::Text
        }
    }

    /// HTML `type` attribute value for this mode.
    pub fn as_html_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
        }
    }
}

/// Formats elapsed whole seconds as `{h}h {m}m {s}s`.
///
/// The hour segment is dropped when zero, the minute segment is dropped when
/// it and the hour are both zero. Seconds are always shown.
pub fn format_elapsed(total_secs: u64) -> String {
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hrs = total_secs / 3_600;

    if hrs > 0 {
        format!("{hrs}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Full timer label for `total_secs` of session time.
pub fn timer_label(total_secs: u64) -> String {
    format!("{TIMER_LABEL_PREFIX}{}", format_elapsed(total_secs))
}

/// Button set of the host's native message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBoxButtons {
    /// OK only.
    Ok,
    /// OK and Cancel.
    OkCancel,
    /// Abort, Retry and Ignore.
    AbortRetryIgnore,
    /// Yes, No and Cancel.
    YesNoCancel,
    /// Yes and No.
    YesNo,
    /// Retry and Cancel.
    RetryCancel,
    /// Cancel, Try Again and Continue.
    CancelTryContinue,
}

impl MessageBoxButtons {
    /// Native flag value.
    pub fn code(self) -> u32 {
        match self {
            Self::Ok => 0x0000_0000,
            Self::OkCancel => 0x0000_0001,
            Self::AbortRetryIgnore => 0x0000_0002,
            Self::YesNoCancel => 0x0000_0003,
            Self::YesNo => 0x0000_0004,
            Self::RetryCancel => 0x0000_0005,
            Self::CancelTryContinue => 0x0000_0006,
        }
    }
}

/// Icon of the host's native message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBoxIcon {
    /// No icon.
    None,
    /// Error icon.
    Error,
    /// Question icon.
    Question,
    /// Warning icon.
    Warning,
    /// Information icon.
    Information,
}

impl MessageBoxIcon {
    /// Native flag value.
    pub fn code(self) -> u32 {
        match self {
            Self::None => 0x0000_0000,
            Self::Error => 0x0000_0010,
            Self::Question => 0x0000_0020,
            Self::Warning => 0x0000_0030,
            Self::Information => 0x0000_0040,
        }
    }
}

/// Button pressed to dismiss the host's native message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBoxResult {
    /// OK.
    Ok,
    /// Cancel.
    Cancel,
    /// Abort.
    Abort,
    /// Retry.
    Retry,
    /// Ignore.
    Ignore,
    /// Yes.
    Yes,
    /// No.
    No,
    /// Try Again.
    TryAgain,
    /// Continue.
    Continue,
}

impl MessageBoxResult {
    /// Maps a native return code, `None` for codes the dialog never returns.
    pub fn from_code(code: u32) -> Option<Self> {
        let result = match code {
            1 => Self::Ok,
            2 => Self::Cancel,
            3 => Self::Abort,
            4 => Self::Retry,
            5 => Self::Ignore,
            6 => Self::Yes,
            7 => Self::No,
            10 => Self::TryAgain,
            11 => Self::Continue,
            _ => return None,
        };
        Some(result)
    }
}

/// Error type for host payload decoding.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A JSON record returned by the host could not be decoded.
    #[error("malformed {record} payload: {source}")]
    MalformedPayload {
        /// Which host record failed (`details` or `user`).
        record: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
