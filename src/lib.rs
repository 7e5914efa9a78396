pub mod config;
pub mod controller;
pub mod cookie;
pub mod errors;
pub mod schema;
pub mod storage;
pub mod views;

pub use config::ConsentConfig;
pub use controller::{detached_handle, ConsentController, ConsentHandle, ConsentProvider};
pub use cookie::{Cookie, CookieJar, CookieJarHandle, InMemoryCookieJar, SameSite};
pub use errors::ConsentError;
pub use schema::{CategoryPreferences, ConsentCategory, ConsentRecord, CURRENT_SCHEMA_VERSION};
pub use storage::ConsentStorage;
pub use views::ViewCounter;
