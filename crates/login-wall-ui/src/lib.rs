#![warn(missing_docs)]
//! # login-wall-ui
//!
//! ## Purpose
//! Defines the document surface the login and session pages render into.
//!
//! ## Responsibilities
//! - Name the element identifiers the page templates must provide.
//! - Abstract element reads and writes behind [`ViewSurface`] so controllers
//!   run against a real webview bridge or the in-memory [`MemoryView`].
//! - Fade out and remove the loading overlay.
//!
//! ## Data flow
//! Controllers -> [`ViewSurface`] writes -> document. User input arrives as
//! [`UiEvent`] values dispatched by the page.
//!
//! ## Ownership and lifetimes
//! Views are shared as `Arc<dyn ViewSurface>`; every method takes `&self`
//! and implementations use interior locking.
//!
//! ## Error model
//! Accessing an element that the template does not provide returns
//! [`UiError::MissingElement`]. Only [`fade_out`] treats absence as a no-op.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use login_wall_core::InputMode;
use thiserror::Error;
use tracing::debug;

/// CSS class that starts the overlay fade transition.
pub const FADE_OUT_CLASS: &str = "fade-out";

/// Default fade transition length, matching the page stylesheet.
pub const DEFAULT_FADE: Duration = Duration::from_millis(800);

/// Key name that submits the login field.
pub const ENTER_KEY: &str = "Enter";

/// Element identifiers the page templates provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    /// Machine name on the login wall.
    PcName,
    /// Login code input.
    IdInput,
    /// Full-page loading overlay.
    LoadingScreen,
    /// Session user name header.
    WelcomeHeader,
    /// Session duration label.
    StatusTimer,
    /// Report button on the session page.
    BtnReport,
    /// Logout button on the session page.
    BtnLogout,
    /// Details refresh button on the login wall.
    BtnRefresh,
    /// Installed version label.
    LblVersion,
    /// Last update label.
    LblUpdated,
}

impl ElementId {
    /// Every identifier, in declaration order.
    pub const ALL: [ElementId; 10] = [
        ElementId::PcName,
        ElementId::IdInput,
        ElementId::LoadingScreen,
        ElementId::WelcomeHeader,
        ElementId::StatusTimer,
        ElementId::BtnReport,
        ElementId::BtnLogout,
        ElementId::BtnRefresh,
        ElementId::LblVersion,
        ElementId::LblUpdated,
    ];

    /// DOM `id` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PcName => "pc-name",
            Self::IdInput => "id_input",
            Self::LoadingScreen => "loading-screen",
            Self::WelcomeHeader => "welcome-header",
            Self::StatusTimer => "status-timer",
            Self::BtnReport => "btn_report",
            Self::BtnLogout => "btn_logout",
            Self::BtnRefresh => "btn-refresh",
            Self::LblVersion => "lbl-version",
            Self::LblUpdated => "lbl-updated",
        }
    }

    /// Looks up an identifier by its DOM `id` attribute.
    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|element| element.as_str() == id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User interaction delivered to a page controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Document-level key press.
    KeyDown {
        /// `KeyboardEvent.key` value.
        key: String,
    },
    /// Value of an input element changed.
    Input {
        /// Element whose value changed.
        target: ElementId,
    },
    /// Element was clicked.
    Click {
        /// Clicked element.
        target: ElementId,
    },
}

impl UiEvent {
    /// Key press shorthand.
    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }
}

/// Whether a key handler consumed the event (the `preventDefault` case).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Handler acted on the key.
    Handled,
    /// Key is left to default handling.
    Ignored,
}

/// Element-level access to the rendered page.
pub trait ViewSurface: Send + Sync {
    /// Returns `true` when the element is present in the document.
    fn has_element(&self, id: ElementId) -> bool;

    /// Reads the element's text content.
    fn text(&self, id: ElementId) -> Result<String, UiError>;

    /// Replaces the element's text content.
    fn set_text(&self, id: ElementId, text: &str) -> Result<(), UiError>;

    /// Reads an input element's current value.
    fn input_value(&self, id: ElementId) -> Result<String, UiError>;

    /// Replaces an input element's current value.
    fn set_input_value(&self, id: ElementId, value: &str) -> Result<(), UiError>;

    /// Reads an input element's display mode.
    fn input_mode(&self, id: ElementId) -> Result<InputMode, UiError>;

    /// Switches an input element between plain and masked display.
    fn set_input_mode(&self, id: ElementId, mode: InputMode) -> Result<(), UiError>;

    /// Enables or disables a control.
    fn set_disabled(&self, id: ElementId, disabled: bool) -> Result<(), UiError>;

    /// Adds a CSS class to the element.
    fn add_class(&self, id: ElementId, class: &str) -> Result<(), UiError>;

    /// Removes the element from the document.
    fn remove_element(&self, id: ElementId) -> Result<(), UiError>;

    /// Shows a blocking browser alert.
    fn alert(&self, message: &str);
}

/// Fades the element out and removes it once the transition has run.
///
/// An element that is not in the document is ignored.
pub async fn fade_out(view: &dyn ViewSurface, id: ElementId, transition: Duration) {
    if !view.has_element(id) {
        debug!(element = %id, "fade_out skipped: element absent");
        return;
    }

    if view.add_class(id, FADE_OUT_CLASS).is_err() {
        return;
    }
    tokio::time::sleep(transition).await;
    if let Err(error) = view.remove_element(id) {
        debug!(element = %id, %error, "fade_out: element vanished during transition");
    }
}

/// Snapshot of one element in a [`MemoryView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState {
    /// Text content.
    pub text: String,
    /// Input value, for input elements.
    pub value: String,
    /// Input display mode.
    pub mode: InputMode,
    /// Disabled flag, for controls.
    pub disabled: bool,
    /// CSS classes in insertion order.
    pub classes: Vec<String>,
}

impl ElementState {
    fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: String::new(),
            mode: InputMode::Text,
            disabled: false,
            classes: Vec::new(),
        }
    }
}

/// One recorded mutation in a [`MemoryView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewWrite {
    /// Text content replaced.
    Text(ElementId, String),
    /// Input value replaced.
    Value(ElementId, String),
    /// Input display mode switched.
    Mode(ElementId, InputMode),
    /// Disabled flag set.
    Disabled(ElementId, bool),
    /// CSS class added.
    Class(ElementId, String),
    /// Element removed.
    Removed(ElementId),
}

impl ViewWrite {
    /// Element the write targeted.
    pub fn element(&self) -> ElementId {
        match self {
            Self::Text(id, _)
            | Self::Value(id, _)
            | Self::Mode(id, _)
            | Self::Disabled(id, _)
            | Self::Class(id, _)
            | Self::Removed(id) => *id,
        }
    }
}

#[derive(Debug, Default)]
struct Document {
    elements: BTreeMap<ElementId, ElementState>,
    writes: Vec<ViewWrite>,
    alerts: Vec<String>,
}

/// In-memory document used by tests and the headless binary.
///
/// Every mutation is appended to a write log.
#[derive(Debug, Default)]
pub struct MemoryView {
    document: Mutex<Document>,
}

impl MemoryView {
    /// Creates a document with the given elements, all empty.
    pub fn with_elements(ids: &[ElementId]) -> Self {
        let view = Self::default();
        for id in ids {
            view.insert(*id, "");
        }
        view
    }

    /// Login wall template.
    pub fn login_page() -> Self {
        let view = Self::with_elements(&[
            ElementId::LoadingScreen,
            ElementId::PcName,
            ElementId::IdInput,
            ElementId::BtnRefresh,
        ]);
        view.insert(ElementId::LblVersion, "?");
        view.insert(ElementId::LblUpdated, "?");
        view
    }

    /// Session page template.
    pub fn session_page() -> Self {
        let view = Self::with_elements(&[
            ElementId::LoadingScreen,
            ElementId::StatusTimer,
            ElementId::BtnReport,
            ElementId::BtnLogout,
        ]);
        view.insert(ElementId::WelcomeHeader, "Welcome");
        view
    }

    /// Adds or replaces an element with initial text. Not logged as a write.
    pub fn insert(&self, id: ElementId, text: &str) {
        if let Ok(mut document) = self.document.lock() {
            document.elements.insert(id, ElementState::with_text(text));
        }
    }

    /// Snapshot of an element, `None` when absent.
    pub fn element(&self, id: ElementId) -> Option<ElementState> {
        self.document
            .lock()
            .ok()
            .and_then(|document| document.elements.get(&id).cloned())
    }

    /// Full write log.
    pub fn writes(&self) -> Vec<ViewWrite> {
        self.document
            .lock()
            .map(|document| document.writes.clone())
            .unwrap_or_default()
    }

    /// Writes that targeted `id`, in order.
    pub fn writes_to(&self, id: ElementId) -> Vec<ViewWrite> {
        self.writes()
            .into_iter()
            .filter(|write| write.element() == id)
            .collect()
    }

    /// Alerts raised so far.
    pub fn alerts(&self) -> Vec<String> {
        self.document
            .lock()
            .map(|document| document.alerts.clone())
            .unwrap_or_default()
    }

    fn read<T>(
        &self,
        id: ElementId,
        read: impl FnOnce(&ElementState) -> T,
    ) -> Result<T, UiError> {
        let document = self.document.lock().map_err(|_| UiError::Poisoned)?;
        document
            .elements
            .get(&id)
            .map(read)
            .ok_or(UiError::MissingElement(id))
    }

    fn write(
        &self,
        id: ElementId,
        record: ViewWrite,
        apply: impl FnOnce(&mut ElementState),
    ) -> Result<(), UiError> {
        let mut document = self.document.lock().map_err(|_| UiError::Poisoned)?;
        let element = document
            .elements
            .get_mut(&id)
            .ok_or(UiError::MissingElement(id))?;
        apply(element);
        document.writes.push(record);
        Ok(())
    }
}

impl ViewSurface for MemoryView {
    fn has_element(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    fn text(&self, id: ElementId) -> Result<String, UiError> {
        self.read(id, |element| element.text.clone())
    }

    fn set_text(&self, id: ElementId, text: &str) -> Result<(), UiError> {
        self.write(id, ViewWrite::Text(id, text.to_string()), |element| {
            element.text = text.to_string();
        })
    }

    fn input_value(&self, id: ElementId) -> Result<String, UiError> {
        self.read(id, |element| element.value.clone())
    }

    fn set_input_value(&self, id: ElementId, value: &str) -> Result<(), UiError> {
        self.write(id, ViewWrite::Value(id, value.to_string()), |element| {
            element.value = value.to_string();
        })
    }

    fn input_mode(&self, id: ElementId) -> Result<InputMode, UiError> {
        self.read(id, |element| element.mode)
    }

    fn set_input_mode(&self, id: ElementId, mode: InputMode) -> Result<(), UiError> {
        self.write(id, ViewWrite::Mode(id, mode), |element| element.mode = mode)
    }

    fn set_disabled(&self, id: ElementId, disabled: bool) -> Result<(), UiError> {
        self.write(id, ViewWrite::Disabled(id, disabled), |element| {
            element.disabled = disabled;
        })
    }

    fn add_class(&self, id: ElementId, class: &str) -> Result<(), UiError> {
        self.write(id, ViewWrite::Class(id, class.to_string()), |element| {
            if !element.classes.iter().any(|existing| existing == class) {
                element.classes.push(class.to_string());
            }
        })
    }

    fn remove_element(&self, id: ElementId) -> Result<(), UiError> {
        let mut document = self.document.lock().map_err(|_| UiError::Poisoned)?;
        document
            .elements
            .remove(&id)
            .ok_or(UiError::MissingElement(id))?;
        document.writes.push(ViewWrite::Removed(id));
        Ok(())
    }

    fn alert(&self, message: &str) {
        if let Ok(mut document) = self.document.lock() {
            document.alerts.push(message.to_string());
        }
    }
}

/// View access errors.
#[derive(Debug, Error)]
pub enum UiError {
    /// The page template does not provide the element.
    #[error("element #{0} is missing from the document")]
    MissingElement(ElementId),
    /// The in-memory document lock was poisoned by a panicking writer.
    #[error("document lock poisoned")]
    Poisoned,
}
