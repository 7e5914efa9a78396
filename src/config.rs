//! Consent configuration.
//!
//! `ConsentConfig` pins the deployment-stable parts of the cookie contract:
//! the cookie name (must match any sibling system reading the same consent),
//! the expiry policy, the registrable root domain consent is shared under,
//! and the site URL the subsystem believes it is running on (host and scheme
//! drive the `Domain` and `Secure` attribute rules).
//!
//! Defaults are suitable for local development; production embedders use the
//! builder:
//!
//! ```rust
//! use consent_engine::config::ConsentConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ConsentConfig::builder()
//!     .root_domain("example.com")
//!     .site_url("https://www.example.com/")?
//!     .build()?;
//! assert!(cfg.is_https());
//! # Ok(()) }
//! ```

use std::fmt;

use url::Url;

/// Default storage slot for the consent record. Stable across deployments.
const DEFAULT_COOKIE_NAME: &str = "cookie_consent";

/// Default number of days a stored record stays valid in the browser,
/// independent of schema-version invalidation.
const DEFAULT_EXPIRY_DAYS: i64 = 365;

/// Configuration for the consent subsystem.
#[derive(Debug, Clone)]
pub struct ConsentConfig {
    /// Name of the cookie holding the consent record.
    pub cookie_name: String,
    /// Browser-side expiry of the record, in days.
    pub expiry_days: i64,
    /// Registrable parent domain shared by all product subdomains.
    pub root_domain: String,
    /// URL the page is served from; host and scheme are derived from it.
    pub site_url: Url,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            expiry_days: DEFAULT_EXPIRY_DAYS,
            root_domain: "example.com".to_string(),
            site_url: Url::parse("http://localhost/").expect("static URL"),
        }
    }
}

impl ConsentConfig {
    pub fn builder() -> ConsentConfigBuilder {
        ConsentConfigBuilder::default()
    }

    /// Host the page is served from (empty for pathological URLs).
    pub fn host(&self) -> &str {
        self.site_url.host_str().unwrap_or_default()
    }

    /// Whether the page is served over HTTPS.
    pub fn is_https(&self) -> bool {
        self.site_url.scheme() == "https"
    }
}

/// Builder for [`ConsentConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConsentConfigBuilder {
    inner: ConsentConfig,
}

impl ConsentConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ConsentConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn cookie_name<S: Into<String>>(self, name: S) -> Self {
        self.map(|c| c.cookie_name = name.into())
    }

    pub fn expiry_days(self, days: i64) -> Self {
        self.map(|c| c.expiry_days = days)
    }

    pub fn root_domain<S: Into<String>>(self, domain: S) -> Self {
        self.map(|c| c.root_domain = domain.into())
    }

    /// Sets the site URL from a string; parse failures surface immediately.
    pub fn site_url(mut self, url: &str) -> Result<Self, ConsentConfigError> {
        self.inner.site_url = Url::parse(url).map_err(ConsentConfigError::InvalidSiteUrl)?;
        Ok(self)
    }

    /// Sets the site URL from an already-parsed [`Url`].
    pub fn site(self, url: Url) -> Self {
        self.map(|c| c.site_url = url)
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ConsentConfig)) -> Self {
        self.map(f)
    }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ConsentConfig, ConsentConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone)]
pub enum ConsentConfigError {
    EmptyCookieName,
    ZeroExpiry,
    EmptyRootDomain,
    InvalidSiteUrl(url::ParseError),
}

impl fmt::Display for ConsentConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentConfigError::EmptyCookieName => write!(f, "cookie_name must not be empty"),
            ConsentConfigError::ZeroExpiry => write!(f, "expiry_days must be at least 1"),
            ConsentConfigError::EmptyRootDomain => write!(f, "root_domain must not be empty"),
            ConsentConfigError::InvalidSiteUrl(e) => write!(f, "invalid site URL: {e}"),
        }
    }
}
impl std::error::Error for ConsentConfigError {}

fn validate(c: &ConsentConfig) -> Result<(), ConsentConfigError> {
    if c.cookie_name.is_empty() {
        return Err(ConsentConfigError::EmptyCookieName);
    }
    if c.expiry_days < 1 {
        return Err(ConsentConfigError::ZeroExpiry);
    }
    if c.root_domain.is_empty() {
        return Err(ConsentConfigError::EmptyRootDomain);
    }
    Ok(())
}
