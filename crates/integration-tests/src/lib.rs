//! Integration tests for Panier.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p panier-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Store semantics: merging, quantities, totals, persistence
//! - `cart_session` - Controller sessions over file storage, as a page would run them

use panier_cart::{CartController, CartStore, FileStorage, LatestView, NotificationLog};

/// Controller type used by session tests.
pub type TestSession = CartController<FileStorage, LatestView, NotificationLog>;

/// Start a session over `dir`, restoring whatever an earlier session saved.
///
/// # Panics
///
/// Panics if the storage directory cannot be read.
#[must_use]
pub fn open_session(dir: &std::path::Path) -> TestSession {
    let store = CartStore::new(FileStorage::new(dir));
    let mut session = CartController::new(store, LatestView::new(), NotificationLog::new());
    session.init().expect("session init");
    session
}
