//! Cache types for server-held lists.

use std::sync::Arc;

use giftshop_core::{CartLine, ProductId, User, WishlistEntry};

/// Cache key for the session's read replicas.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    CurrentUser,
    Cart,
    Wishlist,
    WishlistCheck(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    User(Box<User>),
    Cart(Arc<Vec<CartLine>>),
    Wishlist(Arc<Vec<WishlistEntry>>),
    InWishlist(bool),
}
