//! Giftshop storefront client.
//!
//! # Architecture
//!
//! - [`Session`] is the explicit context object: it owns the HTTP client, a
//!   `moka` cache of server-held lists, the location table and an event bus.
//!   It is created at session start and torn down at logout.
//! - [`CartStore`] and [`WishlistStore`] are read replicas of the server's
//!   cart and wishlist. Mutations are plain request/response calls; a success
//!   invalidates the cached list and broadcasts an invalidation event, a
//!   failure is classified into a [`Notice`].
//! - [`AddressResolver`] answers cascading state/district/area queries over
//!   the static location table.
//!
//! # Example
//!
//! ```rust,ignore
//! use giftshop_client::{ClientConfig, Session};
//!
//! let session = Session::start(ClientConfig::from_env()?)?;
//! let cart = session.cart();
//!
//! cart.add_item(&product_id, 2).await?;
//! let snapshot = cart.snapshot().await?;
//! println!("{} items, {}", snapshot.totals.total_items, snapshot.totals.total_price);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cache;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod mutation;
pub mod notice;
pub mod session;
pub mod telemetry;
pub mod wishlist;

pub use address::{AddressResolver, LoadState};
pub use cart::{CartSnapshot, CartStore};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::ApiClient;
pub use mutation::MutationState;
pub use notice::{ErrorCategory, MutationKind, Notice, NoticeKind};
pub use session::{Session, StoreEvent};
pub use wishlist::WishlistStore;
