//! Catalog product types.
//!
//! These mirror the product feed consumed by the storefront (the Fake Store
//! API JSON shape), providing an ergonomic domain type separate from any
//! transport concerns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product from the catalog feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price in USD.
    pub price: Decimal,
    /// Long-form description.
    pub description: String,
    /// Category handle (e.g., "electronics").
    pub category: String,
    /// Primary image URL.
    pub image: String,
    /// Aggregated customer rating.
    pub rating: Rating,
}

/// Aggregated customer rating for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating value (e.g., 4.5).
    pub rate: f64,
    /// Total number of reviews.
    pub count: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_feed_shape() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Fits 15 inch laptops",
            "category": "men's clothing",
            "image": "https://example.test/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, "109.95".parse().unwrap());
        assert_eq!(product.rating.count, 120);
    }
}
