//! Cart store: a read replica of the server-held cart.
//!
//! Reads are served from the session cache until a mutation invalidates it.
//! Totals are never cached; they are folded over the lines on every read so
//! they can't drift from the lines they summarize.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use giftshop_core::{CartLine, CartTotals, ProductId};

use crate::cache::{CacheKey, CacheValue};
use crate::error::Result;
use crate::mutation::{self, MutationState};
use crate::notice::{MutationKind, Notice};
use crate::session::Session;
use crate::telemetry;

/// Cart lines with their derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

impl CartSnapshot {
    /// Build a snapshot, computing totals from `lines`.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        let totals = CartTotals::from_lines(&lines);
        if totals.unpriced_lines > 0 {
            tracing::warn!(
                unpriced = totals.unpriced_lines,
                "Cart lines with unparsable prices were left out of the total"
            );
        }
        Self { lines, totals }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateQuantityBody {
    quantity: u32,
}

/// Cart operations for the session's user.
#[derive(Clone)]
pub struct CartStore {
    session: Session,
}

impl CartStore {
    pub(crate) const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Current cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart has to be fetched and the request fails.
    #[instrument(skip(self))]
    pub async fn lines(&self) -> Result<Arc<Vec<CartLine>>> {
        if let Some(CacheValue::Cart(lines)) = self.session.cached(&CacheKey::Cart).await {
            return Ok(lines);
        }

        let lines = Arc::new(self.session.api().get_list::<CartLine>("api/cart").await?);
        self.session
            .store(CacheKey::Cart, CacheValue::Cart(Arc::clone(&lines)))
            .await;
        Ok(lines)
    }

    /// Cart lines plus `total_items` and `total_price`.
    ///
    /// # Errors
    ///
    /// Same as [`CartStore::lines`].
    pub async fn snapshot(&self) -> Result<CartSnapshot> {
        let lines = self.lines().await?;
        Ok(CartSnapshot::new(lines.as_ref().clone()))
    }

    /// Quantity of `product_id` in the cart (0 if absent).
    ///
    /// # Errors
    ///
    /// Same as [`CartStore::lines`].
    pub async fn quantity_of(&self, product_id: &ProductId) -> Result<u32> {
        Ok(self
            .lines()
            .await?
            .iter()
            .find(|l| &l.product_id == product_id)
            .map_or(0, |l| l.quantity))
    }

    /// Whether `product_id` is in the cart.
    ///
    /// # Errors
    ///
    /// Same as [`CartStore::lines`].
    pub async fn contains(&self, product_id: &ProductId) -> Result<bool> {
        Ok(self.quantity_of(product_id).await? > 0)
    }

    /// Current mutation state: `Pending` while any mutation is in flight.
    #[must_use]
    pub fn state(&self) -> MutationState {
        self.session.cart_mutations().state()
    }

    /// Whether a mutation is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == MutationState::Pending
    }

    async fn mutate<F>(&self, kind: MutationKind, request: F) -> std::result::Result<(), Notice>
    where
        F: Future<Output = Result<()>>,
    {
        mutation::run(
            &self.session,
            self.session.cart_mutations(),
            kind,
            &[CacheKey::Cart],
            request,
        )
        .await
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the backend rejects the request.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> std::result::Result<(), Notice> {
        let kind = MutationKind::AddToCart;
        telemetry::mutation_breadcrumb(
            kind,
            &[
                ("product_id", product_id.to_string()),
                ("quantity", quantity.to_string()),
            ],
        );

        let body = AddItemBody {
            product_id,
            quantity,
        };
        self.mutate(
            kind,
            self.session.api().send(Method::POST, "api/cart", Some(&body)),
        )
        .await
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// Same as [`CartStore::add_item`].
    pub async fn add_one(&self, product_id: &ProductId) -> std::result::Result<(), Notice> {
        self.add_item(product_id, 1).await
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the backend rejects the request.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> std::result::Result<(), Notice> {
        let kind = MutationKind::UpdateCartQuantity;
        telemetry::mutation_breadcrumb(
            kind,
            &[
                ("product_id", product_id.to_string()),
                ("quantity", quantity.to_string()),
            ],
        );

        let path = format!("api/cart/{product_id}");
        let body = UpdateQuantityBody { quantity };
        self.mutate(
            kind,
            self.session.api().send(Method::PUT, &path, Some(&body)),
        )
        .await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the backend rejects the request.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> std::result::Result<(), Notice> {
        let kind = MutationKind::RemoveFromCart;
        telemetry::mutation_breadcrumb(kind, &[("product_id", product_id.to_string())]);

        let path = format!("api/cart/{product_id}");
        self.mutate(kind, self.session.api().send_empty(Method::DELETE, &path))
            .await
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Notice`] if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> std::result::Result<(), Notice> {
        let kind = MutationKind::ClearCart;
        telemetry::mutation_breadcrumb(kind, &[]);

        self.mutate(kind, self.session.api().send_empty(Method::DELETE, "api/cart"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use giftshop_core::ProductSnapshot;

    use super::*;

    fn line(id: &str, price: &str, quantity: u32) -> CartLine {
        let product_id = ProductId::parse(id).unwrap();
        CartLine {
            product_id: product_id.clone(),
            quantity,
            product: ProductSnapshot {
                id: product_id,
                name: "Hamper".to_string(),
                price: price.to_string(),
                images: vec![],
                stock: Some(10),
                min_order_quantity: None,
            },
        }
    }

    #[test]
    fn test_snapshot_totals() {
        let snapshot = CartSnapshot::new(vec![
            line("aaaaaaaaaaaaaaaaaaaaaaaa", "100.00", 2),
            line("bbbbbbbbbbbbbbbbbbbbbbbb", "49.50", 1),
        ]);
        assert_eq!(snapshot.totals.total_items, 3);
        assert_eq!(snapshot.totals.total_price.to_string(), "₹249.50");
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_line_lookup() {
        let id = ProductId::parse("bbbbbbbbbbbbbbbbbbbbbbbb").unwrap();
        let snapshot = CartSnapshot::new(vec![line(id.as_str(), "5", 4)]);
        assert_eq!(snapshot.line(&id).unwrap().quantity, 4);

        let other = ProductId::parse("cccccccccccccccccccccccc").unwrap();
        assert!(snapshot.line(&other).is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CartSnapshot::new(Vec::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.totals.total_items, 0);
    }

    #[test]
    fn test_snapshot_serializes_flat_totals() {
        let snapshot = CartSnapshot::new(vec![line("aaaaaaaaaaaaaaaaaaaaaaaa", "10.00", 3)]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalItems"], 3);
        assert!(json["lines"].is_array());
    }
}
