//! Panier Cart library.
//!
//! The cart engine behind the shopping-cart widget: an ordered list of line
//! items, the totals derived from it, and its synchronization with a
//! key-value store and a view.
//!
//! # Data flow
//!
//! ```text
//! view intent -> CartController::dispatch -> CartStore mutation
//!             -> CartView snapshot -> Renderer::render -> CartStore::persist
//! ```
//!
//! Everything runs to completion on the caller's thread. Collaborators
//! (storage, renderer, notifier) are traits so a browser binding, a terminal
//! front end and tests can each plug in their own.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;
pub mod view;

pub use config::{CartConfig, ConfigError, LogFormat};
pub use controller::{CartController, CartIntent, CheckoutOutcome, DispatchOutcome};
pub use error::{CartError, Result};
pub use notify::{Notification, NotificationLog, Notifier, TracingNotifier};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CART_STORAGE_KEY, CartStore, LineItem};
pub use view::{CartItemView, CartView, EMPTY_CART_MESSAGE, LatestView, Renderer};
