//! Cart line items and aggregate state.
//!
//! A cart holds at most one line item per product ID; adding the same
//! product again increments its quantity. The aggregate fields of
//! [`CartState`] (`total`, `item_count`) are always derived from the line
//! items - they are recomputed after every mutation, never set directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::product::Product;

/// Maximum quantity for a single line item.
pub const MAX_QUANTITY: u32 = 99;

/// A cart line item: one product ID and its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identity, unique within the cart.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price in USD.
    pub price: Decimal,
    /// Primary image URL.
    pub image: String,
    /// Category handle.
    pub category: String,
    /// Quantity, expected to stay within `1..=MAX_QUANTITY`.
    pub quantity: u32,
}

impl CartItem {
    /// Create a line item with quantity 1 from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity: 1,
        }
    }

    /// The line total, `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An immutable snapshot of the cart.
///
/// `total` and `item_count` are derived from `items`; construct snapshots
/// through [`CartState::from_items`] so they can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Line items in insertion order.
    pub items: Vec<CartItem>,
    /// Sum of `price * quantity` over all items.
    pub total: Decimal,
    /// Sum of quantities over all items.
    pub item_count: u32,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }

    /// Build a snapshot from line items, recomputing the aggregates.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::line_total).sum();
        let item_count = items.iter().map(|item| item.quantity).sum();
        Self {
            items,
            total,
            item_count,
        }
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::Rating;

    fn product(id: i64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: price.parse().unwrap(),
            description: String::new(),
            category: "misc".to_string(),
            image: format!("https://example.test/{id}.jpg"),
            rating: Rating {
                rate: 4.0,
                count: 10,
            },
        }
    }

    #[test]
    fn test_empty_state_has_zero_aggregates() {
        let state = CartState::empty();
        assert!(state.is_empty());
        assert_eq!(state.total, Decimal::ZERO);
        assert_eq!(state.item_count, 0);
    }

    #[test]
    fn test_from_items_recomputes_aggregates() {
        let mut a = CartItem::from_product(&product(1, "29.99"));
        a.quantity = 2;
        let b = CartItem::from_product(&product(2, "19.99"));

        let state = CartState::from_items(vec![a, b]);
        assert_eq!(state.item_count, 3);
        assert_eq!(state.total, "79.97".parse().unwrap());
    }

    #[test]
    fn test_line_total() {
        let mut item = CartItem::from_product(&product(5, "10.50"));
        item.quantity = 3;
        assert_eq!(item.line_total(), "31.50".parse().unwrap());
    }
}
