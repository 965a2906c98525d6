//! Core types for Bramble.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod money;
pub mod product;

pub use cart::{CartItem, CartState, MAX_QUANTITY};
pub use id::*;
pub use money::format_usd;
pub use product::{Product, Rating};
