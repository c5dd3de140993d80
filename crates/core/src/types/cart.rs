//! Cart and wishlist line items as reported by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};
use super::price::{CurrencyCode, Price};

/// Product data embedded in a cart line or wishlist entry.
///
/// A snapshot of the product at the time the list was fetched. `price` stays a
/// string on the wire and is parsed when totals are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    /// Unit price as a decimal string (e.g. "49.50").
    pub price: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Units in stock, if the backend reports it.
    #[serde(default)]
    pub stock: Option<u32>,
    /// Smallest quantity that can be ordered.
    #[serde(default)]
    pub min_order_quantity: Option<u32>,
}

impl ProductSnapshot {
    /// Parse the unit price.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend sent something that is not a decimal.
    pub fn unit_price(&self) -> Result<Price, super::price::PriceError> {
        Price::parse(&self.price)
    }
}

/// One product-quantity pair in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(alias = "productSnapshot")]
    pub product: ProductSnapshot,
}

impl CartLine {
    /// Line price (quantity x unit price), or `None` if the price is
    /// unparsable or the product overflows.
    #[must_use]
    pub fn line_price(&self) -> Option<Price> {
        self.product
            .unit_price()
            .ok()
            .and_then(|p| p.checked_times(self.quantity))
    }
}

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of line quantities.
    pub total_items: u64,
    /// Sum of quantity x unit price.
    pub total_price: Price,
    /// Lines whose price could not be parsed and were left out of `total_price`.
    pub unpriced_lines: usize,
}

impl CartTotals {
    /// Fold over the lines.
    ///
    /// Lines with an unparsable price, or whose price would overflow the
    /// total, still count towards `total_items` but are excluded from
    /// `total_price` and counted in `unpriced_lines`.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let currency = CurrencyCode::default();
        lines.iter().fold(
            Self {
                total_items: 0,
                total_price: Price::zero(currency),
                unpriced_lines: 0,
            },
            |acc, line| {
                let total_items = acc.total_items + u64::from(line.quantity);
                match line
                    .line_price()
                    .and_then(|price| acc.total_price.checked_add(price))
                {
                    Some(total_price) => Self {
                        total_items,
                        total_price,
                        unpriced_lines: acc.unpriced_lines,
                    },
                    None => Self {
                        total_items,
                        total_price: acc.total_price,
                        unpriced_lines: acc.unpriced_lines + 1,
                    },
                }
            },
        )
    }
}

/// Presence of a product on a user's wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product: Option<ProductSnapshot>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The signed-in user as returned by `/api/auth/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}
