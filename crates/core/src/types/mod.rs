//! Core types for the Giftshop client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod id;
pub mod location;
pub mod price;

pub use address::{AddressError, AddressField, AddressSelection, is_valid_pincode};
pub use cart::{CartLine, CartTotals, ProductSnapshot, User, WishlistEntry};
pub use id::*;
pub use location::{Area, District, LocationTable, State, names_match};
pub use price::{CurrencyCode, Price, PriceError};
