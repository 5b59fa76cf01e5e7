//! Core types for Panier.
//!
//! This module provides type-safe wrappers for common cart concepts.

pub mod id;
pub mod price;
pub mod quantity;
pub mod status;

pub use id::LineId;
pub use price::{CurrencyCode, Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use status::NotificationKind;
