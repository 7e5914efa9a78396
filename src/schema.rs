//! Consent schema: the versioned record, category enumeration and presets.
//!
//! The [`ConsentRecord`] struct is the single persisted entity of the consent
//! subsystem. On disk (in the consent cookie) it is a JSON object with the
//! keys `version`, `timestamp`, `essential`, `functional`, `analytics` and
//! `marketing` — the serde renames below pin that wire shape so sibling
//! systems reading the same cookie stay compatible.
//!
//! ```rust
//! use consent_engine::schema::{ConsentRecord, ConsentCategory};
//!
//! let record = ConsentRecord::all_accepted();
//! assert!(record.essential);
//! assert!(record.allows(ConsentCategory::Analytics));
//! ```

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Schema version written into every persisted record.
///
/// Bump this whenever the category set or its semantics change; any record
/// stored under an older version is discarded (and deleted) on next read,
/// forcing re-consent.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A visitor's consent decision, as stored in the consent cookie.
///
/// Field order matches the wire object exactly. `essential` is always `true`
/// in every stored and in-memory record; storage normalizes it on both read
/// and write, so hostile or corrupted cookie bytes cannot flip it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Shape/semantics version of this record. See [`CURRENT_SCHEMA_VERSION`].
    #[serde(rename = "version")]
    pub schema_version: u32,

    /// RFC 3339 timestamp of the decision, refreshed on **every** write —
    /// including re-saves of identical preferences (each save is a fresh
    /// decision event for audit purposes).
    #[serde(rename = "timestamp")]
    pub decided_at: String,

    /// Always `true`. Present for symmetry with systems that store category
    /// lists generically; not user-editable.
    pub essential: bool,

    /// Optional capability category (e.g. preference persistence).
    pub functional: bool,

    /// Optional capability category (e.g. usage measurement).
    pub analytics: bool,

    /// Optional capability category (e.g. ad attribution).
    pub marketing: bool,
}

impl ConsentRecord {
    /// The "reject all" preset: essential only, everything optional off.
    ///
    /// `decided_at` is left empty; [`ConsentStorage`](crate::storage::ConsentStorage)
    /// stamps it on write.
    pub fn essential_only() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            decided_at: String::new(),
            essential: true,
            functional: false,
            analytics: false,
            marketing: false,
        }
    }

    /// The "accept all" preset: every category on.
    pub fn all_accepted() -> Self {
        Self {
            functional: true,
            analytics: true,
            marketing: true,
            ..Self::essential_only()
        }
    }

    /// Composes a full record from a partial preference selection.
    ///
    /// A category omitted from `prefs` becomes `false` — it is **not**
    /// inherited from any previous record. Saving preferences is a complete
    /// restatement of the visitor's choices.
    pub fn from_preferences(prefs: &CategoryPreferences) -> Self {
        Self {
            functional: prefs.functional.unwrap_or(false),
            analytics: prefs.analytics.unwrap_or(false),
            marketing: prefs.marketing.unwrap_or(false),
            ..Self::essential_only()
        }
    }

    /// Returns a copy with the invariants restored: `essential` forced on
    /// and `schema_version` set to the current version.
    pub fn normalized(&self) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            essential: true,
            ..self.clone()
        }
    }

    /// Whether this record allows the given category.
    ///
    /// `Essential` is always allowed regardless of the stored flag.
    pub fn allows(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Essential => true,
            ConsentCategory::Functional => self.functional,
            ConsentCategory::Analytics => self.analytics,
            ConsentCategory::Marketing => self.marketing,
        }
    }
}

/// The four consent categories, as a fixed enumeration.
///
/// Code that needs "all categories" or "the optional ones" iterates
/// [`ConsentCategory::ALL`] / [`ConsentCategory::OPTIONAL`] rather than
/// inspecting record keys reflectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentCategory {
    Essential,
    Functional,
    Analytics,
    Marketing,
}

impl ConsentCategory {
    pub const ALL: [ConsentCategory; 4] = [
        ConsentCategory::Essential,
        ConsentCategory::Functional,
        ConsentCategory::Analytics,
        ConsentCategory::Marketing,
    ];

    /// The user-editable categories (everything but `Essential`).
    pub const OPTIONAL: [ConsentCategory; 3] = [
        ConsentCategory::Functional,
        ConsentCategory::Analytics,
        ConsentCategory::Marketing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentCategory::Essential => "essential",
            ConsentCategory::Functional => "functional",
            ConsentCategory::Analytics => "analytics",
            ConsentCategory::Marketing => "marketing",
        }
    }
}

impl std::fmt::Display for ConsentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial preference selection, as produced by a settings panel.
///
/// `None` means "not mentioned", which a save treats the same as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPreferences {
    pub functional: Option<bool>,
    pub analytics: Option<bool>,
    pub marketing: Option<bool>,
}

impl CategoryPreferences {
    pub fn functional(mut self, on: bool) -> Self {
        self.functional = Some(on);
        self
    }

    pub fn analytics(mut self, on: bool) -> Self {
        self.analytics = Some(on);
        self
    }

    pub fn marketing(mut self, on: bool) -> Self {
        self.marketing = Some(on);
        self
    }
}

/// Current time as an RFC 3339 string, the format used for `decided_at`.
pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_cover_the_category_set() {
        let rejected = ConsentRecord::essential_only();
        assert!(rejected.essential);
        assert!(!rejected.functional && !rejected.analytics && !rejected.marketing);

        let accepted = ConsentRecord::all_accepted();
        assert!(accepted.essential);
        assert!(accepted.functional && accepted.analytics && accepted.marketing);
    }

    #[test]
    fn from_preferences_resets_omitted_categories() {
        let prefs = CategoryPreferences::default().analytics(true);
        let record = ConsentRecord::from_preferences(&prefs);

        assert!(record.essential);
        assert!(!record.functional);
        assert!(record.analytics);
        assert!(!record.marketing);
    }

    #[test]
    fn normalized_restores_invariants() {
        let mut record = ConsentRecord::all_accepted();
        record.essential = false;
        record.schema_version = 99;

        let fixed = record.normalized();
        assert!(fixed.essential);
        assert_eq!(fixed.schema_version, CURRENT_SCHEMA_VERSION);
        // other fields untouched
        assert!(fixed.marketing);
    }

    #[test]
    fn allows_gates_on_stored_flags_except_essential() {
        let record = ConsentRecord::from_preferences(&CategoryPreferences::default().marketing(true));
        assert!(record.allows(ConsentCategory::Essential));
        assert!(!record.allows(ConsentCategory::Functional));
        assert!(!record.allows(ConsentCategory::Analytics));
        assert!(record.allows(ConsentCategory::Marketing));
    }

    #[test]
    fn wire_shape_uses_renamed_keys() {
        let mut record = ConsentRecord::all_accepted();
        record.decided_at = "2025-01-01T00:00:00Z".to_string();

        let value: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["timestamp"], "2025-01-01T00:00:00Z");
        assert_eq!(value["essential"], true);
        assert_eq!(value["marketing"], true);
        assert!(value.get("schema_version").is_none());
    }

    #[test]
    fn category_lists_are_fixed() {
        assert_eq!(ConsentCategory::ALL.len(), 4);
        assert_eq!(ConsentCategory::OPTIONAL.len(), 3);
        assert!(!ConsentCategory::OPTIONAL.contains(&ConsentCategory::Essential));
        assert_eq!(ConsentCategory::Analytics.as_str(), "analytics");
    }
}
