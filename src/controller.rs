//! Consent state controller.
//!
//! [`ConsentController`] is the single in-memory authority the rest of the
//! application talks to. It owns the current consent record, the "has the
//! visitor decided yet" state, and the banner/settings visibility flags, and
//! it exposes every action that mutates consent.
//!
//! The presentation layer consumes it through the [`ConsentProvider`] trait
//! behind a [`ConsentHandle`] (`Arc<RwLock<dyn ConsentProvider + Send + Sync>>`),
//! the same type-erased handle pattern the cookie jar uses. Code that runs
//! outside the application root (before a real controller exists) gets the
//! inert [`DetachedProvider`] from [`detached_handle`] instead of a panic.
//!
//! ### State machine
//! `UNDECIDED` (no valid stored record) moves to `DECIDED` via
//! [`accept_all`](ConsentProvider::accept_all) /
//! [`reject_all`](ConsentProvider::reject_all) /
//! [`save_preferences`](ConsentProvider::save_preferences), and back via
//! [`revoke_consent`](ConsentProvider::revoke_consent). Re-deciding while
//! `DECIDED` is always allowed and refreshes `decided_at` every time.
//! Settings visibility is an orthogonal toggle layered on top, not a state
//! of the machine.
//!
//! ### Failure posture
//! No action ever panics or returns an error. If storage fails, the action
//! still updates in-memory state so the current page session behaves
//! correctly; the decision just will not survive a reload.

use std::sync::{Arc, RwLock};

use crate::schema::{CategoryPreferences, ConsentCategory, ConsentRecord};
use crate::storage::ConsentStorage;

/// A handle to a consent provider.
pub type ConsentHandle = Arc<RwLock<dyn ConsentProvider + Send + Sync>>;

/// The Controller → Presentation contract.
///
/// Getters are cheap reads of in-memory state; actions are synchronous,
/// side-effecting, and safe to call repeatedly.
pub trait ConsentProvider: Send + Sync {
    /// Current consent record, or `None` while undecided.
    fn consent(&self) -> Option<ConsentRecord>;

    /// True only during the initial read of stored consent.
    fn is_loading(&self) -> bool;

    /// Whether a consent decision exists (`consent().is_some()`).
    fn has_consent(&self) -> bool {
        self.consent().is_some()
    }

    /// Whether the consent banner should be rendered.
    ///
    /// Never `true` while [`show_settings`](Self::show_settings) is `true`;
    /// the settings panel takes visual precedence.
    fn show_banner(&self) -> bool;

    /// Whether the settings panel should be rendered.
    fn show_settings(&self) -> bool;

    /// Runs the initial (synchronous) read of stored consent.
    ///
    /// A found record sets current consent and hides the banner; an absent
    /// one shows the banner. Clears the loading flag afterwards. Runs once
    /// per page load; calling it again re-evaluates from storage, which is
    /// how an undecided visitor gets the banner back on the next page view.
    fn initialize(&mut self);

    /// Accepts every category and persists the decision.
    fn accept_all(&mut self);

    /// Rejects every optional category (essential stays on) and persists.
    fn reject_all(&mut self);

    /// Persists a custom selection. A category omitted from `prefs` is
    /// reset to `false`, not inherited from the previous record. Closes
    /// both banner and settings.
    fn save_preferences(&mut self, prefs: &CategoryPreferences);

    /// Opens the settings panel (also dismisses the banner for the rest of
    /// this session).
    fn open_settings(&mut self);

    /// Closes the settings panel. Deliberately does **not** re-show the
    /// banner for a still-undecided visitor; only the next page load does.
    fn close_settings(&mut self);

    /// Whether the given category may run.
    ///
    /// `Essential` is unconditionally `true`, even before any decision.
    /// Every other category is fail-closed: `false` until a stored decision
    /// allows it.
    fn has_consent_for(&self, category: ConsentCategory) -> bool;

    /// Deletes the stored record, clears in-memory consent and reopens the
    /// banner.
    fn revoke_consent(&mut self);
}

/// The real controller, constructed once at the application root.
pub struct ConsentController {
    storage: ConsentStorage,
    consent: Option<ConsentRecord>,
    loading: bool,
    banner_visible: bool,
    settings_visible: bool,
}

impl ConsentController {
    /// Creates a controller that has not yet loaded stored consent.
    ///
    /// Call [`initialize`](ConsentProvider::initialize) before first paint
    /// of the banner.
    pub fn new(storage: ConsentStorage) -> Self {
        Self {
            storage,
            consent: None,
            loading: true,
            banner_visible: false,
            settings_visible: false,
        }
    }

    /// Convenience constructor returning a ready-to-share handle.
    pub fn handle(storage: ConsentStorage) -> ConsentHandle {
        Arc::new(RwLock::new(Self::new(storage)))
    }

    /// Writes `record` through storage and adopts it as current consent.
    ///
    /// In-memory state updates even when the jar write fails, so the
    /// current session keeps behaving as decided.
    fn decide(&mut self, record: ConsentRecord) {
        self.consent = Some(self.storage.write_record(&record));
        self.banner_visible = false;
        self.settings_visible = false;
    }
}

impl ConsentProvider for ConsentController {
    fn consent(&self) -> Option<ConsentRecord> {
        self.consent.clone()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn show_banner(&self) -> bool {
        self.banner_visible && !self.settings_visible && !self.loading
    }

    fn show_settings(&self) -> bool {
        self.settings_visible
    }

    fn initialize(&mut self) {
        match self.storage.read_record() {
            Some(record) => {
                self.consent = Some(record);
                self.banner_visible = false;
            }
            None => {
                self.consent = None;
                self.banner_visible = true;
            }
        }
        self.loading = false;
    }

    fn accept_all(&mut self) {
        self.decide(ConsentRecord::all_accepted());
    }

    fn reject_all(&mut self) {
        self.decide(ConsentRecord::essential_only());
    }

    fn save_preferences(&mut self, prefs: &CategoryPreferences) {
        self.decide(ConsentRecord::from_preferences(prefs));
    }

    fn open_settings(&mut self) {
        self.settings_visible = true;
        // Session-sticky dismissal: the banner stays away after the panel
        // closes, whether or not the visitor decided.
        self.banner_visible = false;
    }

    fn close_settings(&mut self) {
        self.settings_visible = false;
    }

    fn has_consent_for(&self, category: ConsentCategory) -> bool {
        if category == ConsentCategory::Essential {
            return true;
        }
        self.consent
            .as_ref()
            .map(|record| record.allows(category))
            .unwrap_or(false)
    }

    fn revoke_consent(&mut self) {
        self.storage.delete_record();
        self.consent = None;
        self.banner_visible = true;
        self.settings_visible = false;
    }
}

/// Inert provider returned to code running outside the application root.
///
/// Reads as still-loading with every flag off; actions are no-ops. This is
/// the safe default a settings entry point sees before the real controller
/// is in scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedProvider;

impl ConsentProvider for DetachedProvider {
    fn consent(&self) -> Option<ConsentRecord> {
        None
    }

    fn is_loading(&self) -> bool {
        true
    }

    fn show_banner(&self) -> bool {
        false
    }

    fn show_settings(&self) -> bool {
        false
    }

    fn initialize(&mut self) {}
    fn accept_all(&mut self) {}
    fn reject_all(&mut self) {}
    fn save_preferences(&mut self, _prefs: &CategoryPreferences) {}
    fn open_settings(&mut self) {}
    fn close_settings(&mut self) {}

    fn has_consent_for(&self, category: ConsentCategory) -> bool {
        category == ConsentCategory::Essential
    }

    fn revoke_consent(&mut self) {}
}

/// Mints a handle to the detached sentinel.
pub fn detached_handle() -> ConsentHandle {
    Arc::new(RwLock::new(DetachedProvider))
}
