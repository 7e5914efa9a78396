#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    /// The platform cookie store refused the write (privacy settings,
    /// quota, embedder bridge failure). Callers log and degrade.
    #[error("cookie storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A header string had no `name=value` prefix.
    #[error("invalid cookie header")]
    InvalidCookieHeader,
}
