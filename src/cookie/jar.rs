//! Cookie jar abstraction and an in-memory implementation.
//!
//! A **cookie jar** is the raw persistence medium the consent subsystem
//! writes into. In a real deployment the embedder supplies a jar bridged to
//! its platform's cookie store (e.g. `document.cookie`); tests and headless
//! embedders get [`InMemoryCookieJar`].
//!
//! This module is **not** internally synchronized. Use it via a
//! [`CookieJarHandle`] (`Arc<RwLock<dyn CookieJar + Send + Sync>>`): a read
//! lock for queries, a write lock for mutations.

use std::any::Any;
use std::sync::{Arc, RwLock};

use crate::cookie::header::Cookie;
use crate::errors::ConsentError;

/// A handle to a cookie jar trait.
///
/// Reference-counted, read/write-locked pointer to a type-erased
/// [`CookieJar`].
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// Object-safe contract of the raw cookie medium.
///
/// Implementations apply `Set-Cookie` semantics: a removal cookie
/// (`Max-Age <= 0`) deletes the matching entry, otherwise last write wins.
/// Entries are identified by `(name, domain)` so a host-only cookie and a
/// parent-domain cookie of the same name coexist, exactly as in a browser.
pub trait CookieJar: Send + Sync {
    /// Returns a type-erased reference to the jar.
    fn as_any(&self) -> &dyn Any;

    /// Applies one `Set-Cookie` to the jar.
    ///
    /// Errors model a blocked or failing platform store (e.g. cookies
    /// disabled by browser privacy settings); callers are expected to log
    /// and degrade, not propagate.
    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), ConsentError>;

    /// Returns the value of any live cookie with `name`, regardless of its
    /// domain scope. `None` means no such cookie.
    fn get(&self, name: &str) -> Option<String>;

    /// Removes all cookies from the jar.
    fn clear(&mut self);

    /// Returns the number of live cookies.
    fn len(&self) -> usize;

    /// Returns all live cookies, for diagnostics/inspection.
    fn all(&self) -> Vec<Cookie>;
}

/// In-memory cookie jar with browser-like replace/remove semantics.
#[derive(Debug, Default)]
pub struct InMemoryCookieJar {
    entries: Vec<Cookie>,
}

impl InMemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning a ready-to-share handle.
    pub fn handle() -> CookieJarHandle {
        Arc::new(RwLock::new(Self::new()))
    }
}

impl CookieJar for InMemoryCookieJar {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), ConsentError> {
        if cookie.is_removal() {
            self.entries
                .retain(|c| !(c.name == cookie.name && c.domain == cookie.domain));
            return Ok(());
        }

        // Replace existing cookie with same name and domain scope
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|c| c.name == cookie.name && c.domain == cookie.domain)
        {
            *existing = cookie.clone();
        } else {
            self.entries.push(cookie.clone());
        }

        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.clone())
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn all(&self) -> Vec<Cookie> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(jar: &mut InMemoryCookieJar, header: &str) {
        let cookie = Cookie::parse(header).expect("valid header");
        jar.set_cookie(&cookie).unwrap();
    }

    #[test]
    fn cookiejar_basic_contract() {
        let mut jar = InMemoryCookieJar::new();

        // starts empty
        assert_eq!(jar.len(), 0);
        assert!(jar.get("missing").is_none());

        // set + get
        set(&mut jar, "a=1");
        set(&mut jar, "b=2");
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("a").as_deref(), Some("1"));
        assert_eq!(jar.get("b").as_deref(), Some("2"));

        // overwrite keeps len()
        set(&mut jar, "a=ONE");
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("a").as_deref(), Some("ONE"));

        // clear
        jar.clear();
        assert_eq!(jar.len(), 0);
    }

    #[test]
    fn removal_deletes_matching_scope_only() {
        let mut jar = InMemoryCookieJar::new();
        set(&mut jar, "consent=host-scoped");
        set(&mut jar, "consent=domain-scoped; Domain=.example.com");
        assert_eq!(jar.len(), 2);

        // Host-only removal leaves the domain-scoped entry alone.
        set(&mut jar, "consent=; Max-Age=0");
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("consent").as_deref(), Some("domain-scoped"));

        set(&mut jar, "consent=; Max-Age=0; Domain=.example.com");
        assert_eq!(jar.len(), 0);
        assert!(jar.get("consent").is_none());
    }

    #[test]
    fn domain_scopes_are_distinct_entries() {
        let mut jar = InMemoryCookieJar::new();
        set(&mut jar, "c=1; Domain=.example.com");
        set(&mut jar, "c=2");
        assert_eq!(jar.len(), 2);

        // Same scope replaces rather than duplicates.
        set(&mut jar, "c=3; Domain=.example.com");
        assert_eq!(jar.len(), 2);
    }
}
