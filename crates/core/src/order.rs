//! Immutable order summaries.
//!
//! An [`OrderSummary`] is built exactly once, at the moment a simulated
//! payment completes, from a frozen cart snapshot and the submitted checkout
//! form. It never reads live cart state, so clearing the cart immediately
//! afterwards cannot race with it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::OrderTotals;
use crate::types::cart::CartItem;

/// Literal prefix used when masking card numbers for display.
pub const CARD_MASK_PREFIX: &str = "**** **** **** ";

/// Checkout form fields as submitted by the customer.
///
/// Every field is free text defaulting to empty; the only validation is the
/// browser-native `required`/`type=email` hints on the form itself. Values
/// are accepted as-is, however nonsensical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

/// Shipping address copied from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl From<&CheckoutForm> for ShippingAddress {
    fn from(form: &CheckoutForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            address: form.address.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            zip_code: form.zip_code.clone(),
        }
    }
}

/// Payment method as displayed on the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Card number masked to its last 4 characters.
    pub card_number: String,
    /// Always "Visa" - the simulated gateway does not detect card types.
    pub card_type: String,
}

/// The immutable record produced on successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Generated order ID (`ORD-<millis>-<9 uppercase alphanumerics>`).
    pub order_id: String,
    /// Cart items frozen at submit time.
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl OrderSummary {
    /// Build an order summary from a captured cart snapshot and form data.
    ///
    /// The snapshot must be the one taken at submit time; this function must
    /// not be handed live cart state, which is cleared moments later.
    #[must_use]
    pub fn build(
        order_id: String,
        items: Vec<CartItem>,
        totals: &OrderTotals,
        form: &CheckoutForm,
    ) -> Self {
        Self {
            order_id,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            shipping_address: ShippingAddress::from(form),
            payment_method: PaymentMethod {
                card_number: mask_card_number(&form.card_number),
                card_type: "Visa".to_string(),
            },
        }
    }
}

/// Mask a card number, keeping only its last 4 characters.
///
/// Works on whatever the customer typed - shorter inputs keep every
/// character they have behind the mask prefix.
#[must_use]
pub fn mask_card_number(card_number: &str) -> String {
    let skip = card_number.chars().count().saturating_sub(4);
    let tail: String = card_number.chars().skip(skip).collect();
    format!("{CARD_MASK_PREFIX}{tail}")
}
