//! Literal `Set-Cookie` header builder and parser.
//!
//! The consent subsystem deliberately does **not** depend on a platform
//! cookie-jar API: the exact header string is part of its external contract
//! (sibling subdomains of the same product read the same cookie), so the
//! attributes are built and parsed explicitly here.
//!
//! A built header enumerates exactly these attributes, in this order, with
//! absent ones omitted:
//!
//! ```text
//! name=value; Path=/; Domain=.example.com; Max-Age=31536000; SameSite=Lax; Secure
//! ```
//!
//! Expiry is carried as `Max-Age` (relative seconds, which takes precedence
//! over `Expires` per RFC 6265); `Max-Age=0` is the deletion form.
//!
//! ## Notes & limitations
//! - Parsing is intentionally **minimal**: `Path`, `Domain`, `Max-Age`,
//!   `SameSite` and `Secure` are handled, unknown attributes are ignored.
//!   There is no quoting or URL-decoding of values.
//! - Unlike a request-matching jar, the leading dot of `Domain` is
//!   **preserved** — domain scoping is significant for consent deletion,
//!   which expires both the parent-domain and the host-only record.

use serde::{Deserialize, Serialize};

use crate::errors::ConsentError;

/// SameSite policy for a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("strict") {
            Some(SameSite::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Some(SameSite::Lax)
        } else if s.eq_ignore_ascii_case("none") {
            Some(SameSite::None)
        } else {
            None
        }
    }
}

/// A cookie as written to / read from the jar.
///
/// This is the full attribute set the consent subsystem uses; anything a
/// header carries beyond these is dropped on parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded). JSON for the consent record.
    pub value: String,

    /// Path scoping, `"/"` for everything the consent subsystem writes.
    pub path: Option<String>,

    /// Domain scoping. `Some(".example.com")` shares the cookie across
    /// sibling subdomains; `None` is host-only.
    pub domain: Option<String>,

    /// Lifetime in seconds. `Some(0)` (or negative) expires the cookie
    /// immediately; `None` makes it a session cookie.
    pub max_age: Option<i64>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// SameSite policy, `Lax` for everything the consent subsystem writes.
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// Creates a bare `name=value` cookie with no attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            secure: false,
            same_site: None,
        }
    }

    /// True iff this cookie is an immediate expiration (`Max-Age <= 0`).
    pub fn is_removal(&self) -> bool {
        matches!(self.max_age, Some(age) if age <= 0)
    }

    /// Builds the literal header string for this cookie.
    pub fn to_header(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);

        if let Some(path) = &self.path {
            header.push_str("; Path=");
            header.push_str(path);
        }
        if let Some(domain) = &self.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if let Some(max_age) = self.max_age {
            header.push_str("; Max-Age=");
            header.push_str(&max_age.to_string());
        }
        if let Some(same_site) = self.same_site {
            header.push_str("; SameSite=");
            header.push_str(same_site.as_str());
        }
        if self.secure {
            header.push_str("; Secure");
        }

        header
    }

    /// Parses a header string back into a [`Cookie`].
    ///
    /// Fails only when the string has no `name=value` prefix or an empty
    /// name. Attribute names are matched case-insensitively; a malformed
    /// `Max-Age` is ignored rather than failing the whole parse.
    pub fn parse(header: &str) -> Result<Self, ConsentError> {
        let (name, rest) = header
            .split_once('=')
            .ok_or(ConsentError::InvalidCookieHeader)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsentError::InvalidCookieHeader);
        }

        // First segment is the value, possibly empty.
        let mut parts = rest.split(';');
        let value = parts.next().unwrap_or("").trim();
        let mut cookie = Cookie::new(name, value);

        for part in parts {
            let part = part.trim();
            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.to_string()),
                    "domain" => cookie.domain = Some(v.to_string()),
                    "max-age" => cookie.max_age = v.parse::<i64>().ok(),
                    "samesite" => cookie.same_site = SameSite::parse(v),
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            }
        }

        Ok(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_full_attribute_set_in_order() {
        let cookie = Cookie {
            name: "cookie_consent".to_string(),
            value: "{\"version\":1}".to_string(),
            path: Some("/".to_string()),
            domain: Some(".example.com".to_string()),
            max_age: Some(31_536_000),
            secure: true,
            same_site: Some(SameSite::Lax),
        };

        assert_eq!(
            cookie.to_header(),
            "cookie_consent={\"version\":1}; Path=/; Domain=.example.com; Max-Age=31536000; SameSite=Lax; Secure"
        );
    }

    #[test]
    fn omits_absent_attributes() {
        let cookie = Cookie::new("a", "b");
        assert_eq!(cookie.to_header(), "a=b");
    }

    #[test]
    fn parse_roundtrips_a_built_header() {
        let mut cookie = Cookie::new("consent", "payload");
        cookie.path = Some("/".to_string());
        cookie.domain = Some(".example.com".to_string());
        cookie.max_age = Some(3600);
        cookie.same_site = Some(SameSite::Lax);
        cookie.secure = true;

        let parsed = Cookie::parse(&cookie.to_header()).unwrap();
        assert_eq!(parsed, cookie);
    }

    #[test]
    fn parse_is_case_insensitive_for_attributes() {
        let parsed = Cookie::parse("n=v; PATH=/; dOmAiN=.e.com; SAMESITE=strict; SECURE").unwrap();
        assert_eq!(parsed.path.as_deref(), Some("/"));
        assert_eq!(parsed.domain.as_deref(), Some(".e.com"));
        assert_eq!(parsed.same_site, Some(SameSite::Strict));
        assert!(parsed.secure);
    }

    #[test]
    fn parse_keeps_domain_leading_dot() {
        let parsed = Cookie::parse("n=v; Domain=.example.com").unwrap();
        assert_eq!(parsed.domain.as_deref(), Some(".example.com"));
    }

    #[test]
    fn max_age_zero_is_a_removal() {
        let parsed = Cookie::parse("n=; Max-Age=0; Path=/").unwrap();
        assert!(parsed.is_removal());
        assert!(!Cookie::parse("n=v; Max-Age=10").unwrap().is_removal());
        assert!(!Cookie::parse("n=v").unwrap().is_removal());
    }

    #[test]
    fn parse_rejects_attribute_only_strings() {
        assert!(Cookie::parse("no-equals-sign-here").is_err());
        assert!(Cookie::parse("=value").is_err());
    }

    #[test]
    fn parse_ignores_unknown_attributes_and_bad_max_age() {
        let parsed = Cookie::parse("n=v; HttpOnly; Priority=High; Max-Age=soon").unwrap();
        assert_eq!(parsed.value, "v");
        assert_eq!(parsed.max_age, None);
    }
}
