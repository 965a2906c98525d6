//! Integration tests for Bramble.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bramble-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full cart-to-confirmation flows over the checkout
//!   state machine, driven on a paused tokio clock
//! - `cart_properties` - Property tests for cart aggregate recomputation
//!
//! The tests drive the storefront crate as a library; no HTTP server or
//! external product feed is required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use bramble_core::{Product, ProductId, Rating};

/// Build a catalog product for tests.
///
/// # Panics
///
/// Panics if `price` is not a valid decimal string.
#[must_use]
pub fn test_product(id: i64, title: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: price.parse().expect("valid decimal price"),
        description: format!("{title} description"),
        category: "test goods".to_string(),
        image: format!("https://example.test/images/{id}.jpg"),
        rating: Rating {
            rate: 4.4,
            count: 21,
        },
    }
}
