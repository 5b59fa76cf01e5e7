//! Panier Core - Shared cart types.
//!
//! This crate provides the value types used by the cart engine and its
//! front ends:
//! - `cart` - Cart store, persistence, rendering and intent dispatch
//! - `cli` - Command-line driver around a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types and parsing - no I/O, no storage, no
//! logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for line IDs, prices, quantities, and notification kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
