pub mod header;
pub mod jar;

pub use header::{Cookie, SameSite};
pub use jar::{CookieJar, CookieJarHandle, InMemoryCookieJar};
