//! Giftshop Core - Shared types library.
//!
//! This crate provides common types used across all Giftshop components:
//! - `client` - REST client, cart/wishlist stores and the address resolver
//! - `cli` - Command-line access to the same operations
//!
//! # Architecture
//!
//! The core crate contains only types and pure lookups - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Document ids, prices, the location table, address selections
//!   and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
