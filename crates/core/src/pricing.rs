//! Order pricing.
//!
//! The same computation backs the cart page, the checkout sidebar, and the
//! final order summary: a flat 8% tax on the item subtotal, with shipping
//! always free. Values stay full-precision until formatted for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::cart::CartItem;

/// Flat sales tax rate applied to every order.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Derived pricing for a set of line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of `price * quantity` over all items.
    pub subtotal: Decimal,
    /// `subtotal * TAX_RATE`.
    pub tax: Decimal,
    /// `subtotal + tax`.
    pub total: Decimal,
}

impl OrderTotals {
    /// Totals for an empty item list.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Compute subtotal, tax, and total for a set of line items.
#[must_use]
pub fn compute_totals(items: &[CartItem]) -> OrderTotals {
    let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
    let tax = subtotal * TAX_RATE;
    OrderTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}
