//! Consent storage.
//!
//! [`ConsentStorage`] is the **only** component allowed to read or write the
//! raw cookie medium. It owns the wire contract from the outside: the JSON
//! value shape, the attribute rules (`Path=/`, registrable-domain scoping,
//! `Max-Age`, `SameSite=Lax`, `Secure` under HTTPS), and the self-healing
//! deletion of version-mismatched records.
//!
//! ### Failure posture
//! Everything fails open to "ask the visitor again": parse and shape errors
//! read as no stored consent, and jar write/delete failures are logged and
//! swallowed. Nothing here ever propagates an error to the page.

use log::{debug, warn};

use crate::config::ConsentConfig;
use crate::cookie::{Cookie, CookieJarHandle, SameSite};
use crate::schema::{now_rfc3339, ConsentRecord, CURRENT_SCHEMA_VERSION};

const SECONDS_PER_DAY: i64 = 86_400;

/// Reads and writes the consent record through a [`CookieJarHandle`].
pub struct ConsentStorage {
    config: ConsentConfig,
    jar: CookieJarHandle,
}

impl ConsentStorage {
    pub fn new(config: ConsentConfig, jar: CookieJarHandle) -> Self {
        Self { config, jar }
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// Reads the stored consent record, if a valid one exists.
    ///
    /// Returns `None` when the cookie is absent, when its value fails to
    /// parse as the expected shape, or when its schema version is not
    /// [`CURRENT_SCHEMA_VERSION`]. A version mismatch additionally deletes
    /// the stale cookie so a later read does not see it again.
    ///
    /// The returned record is normalized: `essential` is forced `true` even
    /// if the raw stored bytes say otherwise.
    pub fn read_record(&self) -> Option<ConsentRecord> {
        let raw = {
            let jar = match self.jar.read() {
                Ok(jar) => jar,
                Err(e) => {
                    warn!("consent jar read lock poisoned: {e}");
                    return None;
                }
            };
            jar.get(&self.config.cookie_name)?
        };

        let record: ConsentRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                debug!("stored consent value did not parse, treating as absent: {e}");
                return None;
            }
        };

        if record.schema_version != CURRENT_SCHEMA_VERSION {
            debug!(
                "stored consent has schema version {}, expected {}; discarding",
                record.schema_version, CURRENT_SCHEMA_VERSION
            );
            self.delete_record();
            return None;
        }

        Some(record.normalized())
    }

    /// Persists `record`, normalizing it first, and returns the normalized
    /// form that was written.
    ///
    /// Normalization forces `essential = true`, stamps `schema_version` to
    /// the current version and `decided_at` to now — regardless of what the
    /// caller passed, and regardless of whether any category actually
    /// changed. Jar failures are logged and swallowed; the returned record
    /// is what the session should run with either way.
    pub fn write_record(&self, record: &ConsentRecord) -> ConsentRecord {
        let mut record = record.normalized();
        record.decided_at = now_rfc3339();

        match serde_json::to_string(&record) {
            Ok(value) => {
                let cookie = Cookie {
                    max_age: Some(self.config.expiry_days * SECONDS_PER_DAY),
                    ..self.base_cookie(value, self.cookie_domain())
                };
                self.apply(&cookie);
            }
            Err(e) => warn!("failed to serialize consent record: {e}"),
        }

        record
    }

    /// Expires the stored record immediately.
    ///
    /// Issued for both the registrable-parent-domain scope and the exact
    /// current host scope, covering records written before domain scoping
    /// was introduced.
    pub fn delete_record(&self) {
        if let Some(domain) = self.cookie_domain() {
            self.apply(&Cookie {
                max_age: Some(0),
                ..self.base_cookie(String::new(), Some(domain))
            });
        }

        self.apply(&Cookie {
            max_age: Some(0),
            ..self.base_cookie(String::new(), None)
        });
    }

    /// Cookie skeleton carrying the fixed attribute set from the contract.
    fn base_cookie(&self, value: String, domain: Option<String>) -> Cookie {
        Cookie {
            name: self.config.cookie_name.clone(),
            value,
            path: Some("/".to_string()),
            domain,
            max_age: None,
            secure: self.config.is_https(),
            same_site: Some(SameSite::Lax),
        }
    }

    /// Domain attribute for the current host, per the scoping rules.
    ///
    /// `Some(".<root>")` when the host is the root domain or one of its
    /// subdomains, so sibling subdomains share one consent decision. `None`
    /// on localhost and bare IPs, so local development does not write
    /// cross-contaminating domain cookies.
    fn cookie_domain(&self) -> Option<String> {
        let host = self.config.host();
        let root = &self.config.root_domain;

        if host == "localhost" || host.parse::<std::net::IpAddr>().is_ok() {
            return None;
        }
        if host == root || host.ends_with(&format!(".{root}")) {
            return Some(format!(".{root}"));
        }

        None
    }

    fn apply(&self, cookie: &Cookie) {
        let mut jar = match self.jar.write() {
            Ok(jar) => jar,
            Err(e) => {
                warn!("consent jar write lock poisoned: {e}");
                return;
            }
        };
        if let Err(e) = jar.set_cookie(cookie) {
            warn!("consent cookie write failed (session-only consent): {e}");
        }
    }
}
