//! Wishlist store: presence-only list of saved products.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use giftshop_core::{ProductId, WishlistEntry};

use crate::cache::{CacheKey, CacheValue};
use crate::error::Result;
use crate::mutation::{self, MutationState};
use crate::notice::{MutationKind, Notice};
use crate::session::{Session, StoreEvent};
use crate::telemetry;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddEntryBody<'a> {
    product_id: &'a ProductId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    is_in_wishlist: bool,
}

/// Wishlist operations for the session's user.
#[derive(Clone)]
pub struct WishlistStore {
    session: Session,
}

impl WishlistStore {
    pub(crate) const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Current wishlist entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the list has to be fetched and the request fails.
    #[instrument(skip(self))]
    pub async fn entries(&self) -> Result<Arc<Vec<WishlistEntry>>> {
        if let Some(CacheValue::Wishlist(entries)) = self.session.cached(&CacheKey::Wishlist).await
        {
            return Ok(entries);
        }

        let entries = Arc::new(
            self.session
                .api()
                .get_list::<WishlistEntry>("api/wishlist")
                .await?,
        );
        self.session
            .store(CacheKey::Wishlist, CacheValue::Wishlist(Arc::clone(&entries)))
            .await;
        Ok(entries)
    }

    /// Whether `product_id` is on the wishlist, asked of the backend and
    /// cached per product.
    ///
    /// # Errors
    ///
    /// Returns an error if the check has to be fetched and the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn contains(&self, product_id: &ProductId) -> Result<bool> {
        let key = CacheKey::WishlistCheck(product_id.clone());
        if let Some(CacheValue::InWishlist(present)) = self.session.cached(&key).await {
            return Ok(present);
        }

        let path = format!("api/wishlist/check/{product_id}");
        let response: CheckResponse = self.session.api().get_json(&path).await?;
        self.session
            .store(key, CacheValue::InWishlist(response.is_in_wishlist))
            .await;
        Ok(response.is_in_wishlist)
    }

    /// Current mutation state: `Pending` while any mutation is in flight.
    #[must_use]
    pub fn state(&self) -> MutationState {
        self.session.wishlist_mutations().state()
    }

    async fn mutate<F>(
        &self,
        kind: MutationKind,
        product_id: &ProductId,
        request: F,
    ) -> std::result::Result<(), Notice>
    where
        F: Future<Output = Result<()>>,
    {
        telemetry::mutation_breadcrumb(kind, &[("product_id", product_id.to_string())]);
        mutation::run(
            &self.session,
            self.session.wishlist_mutations(),
            kind,
            &[
                CacheKey::Wishlist,
                CacheKey::WishlistCheck(product_id.clone()),
            ],
            request,
        )
        .await
    }

    /// Save a product.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the backend rejects the request.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> std::result::Result<(), Notice> {
        let body = AddEntryBody { product_id };
        self.mutate(
            MutationKind::AddToWishlist,
            product_id,
            self.session
                .api()
                .send(Method::POST, "api/wishlist", Some(&body)),
        )
        .await
    }

    /// Remove a saved product.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the backend rejects the request.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> std::result::Result<(), Notice> {
        let path = format!("api/wishlist/{product_id}");
        self.mutate(
            MutationKind::RemoveFromWishlist,
            product_id,
            self.session.api().send_empty(Method::DELETE, &path),
        )
        .await
    }

    /// Add the product if absent, remove it if present. Returns whether the
    /// product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the check or the mutation fails.
    pub async fn toggle(&self, product_id: &ProductId) -> std::result::Result<bool, Notice> {
        let present = match self.contains(product_id).await {
            Ok(present) => present,
            Err(err) => {
                let notice = Notice::classify(MutationKind::AddToWishlist, &err);
                if err.is_unauthorized() {
                    self.session.expire().await;
                }
                self.session.emit(StoreEvent::Notice(notice.clone()));
                return Err(notice);
            }
        };

        if present {
            self.remove(product_id).await.map(|()| false)
        } else {
            self.add(product_id).await.map(|()| true)
        }
    }
}
