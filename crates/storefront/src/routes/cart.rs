//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation responds with a fresh fragment rendered from the store's
//! returned snapshot and fires the `cart-updated` trigger so the navbar
//! badge refreshes.
//!
//! Quantity range validation (`1..=MAX_QUANTITY`) happens HERE, not in the
//! store - see the cart store module docs. Out-of-range update requests are
//! ignored and answered with the unchanged cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bramble_core::{CartState, MAX_QUANTITY, ProductId, compute_totals, format_usd};

use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Cart line item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub line_total: String,
    pub quantity: u32,
    pub at_min: bool,
    pub at_max: bool,
    pub dec_quantity: u32,
    pub inc_quantity: u32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl CartView {
    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartState> for CartView {
    fn from(state: &CartState) -> Self {
        let totals = compute_totals(&state.items);
        Self {
            items: state
                .items
                .iter()
                .map(|item| CartItemView {
                    id: item.id.as_i64(),
                    title: item.title.clone(),
                    category: item.category.clone(),
                    image: item.image.clone(),
                    price: format_usd(item.price),
                    line_total: format_usd(item.line_total()),
                    quantity: item.quantity,
                    at_min: item.quantity <= 1,
                    at_max: item.quantity >= MAX_QUANTITY,
                    dec_quantity: item.quantity.saturating_sub(1),
                    inc_quantity: (item.quantity + 1).min(MAX_QUANTITY),
                })
                .collect(),
            item_count: state.item_count,
            subtotal: format_usd(totals.subtotal),
            tax: format_usd(totals.tax),
            total: format_usd(totals.total),
        }
    }
}

// =============================================================================
// Form Data
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i64,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Render the cart items fragment with the `cart-updated` trigger attached.
fn cart_items_response(state: &CartState) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(state),
        },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    CartShowTemplate {
        cart: CartView::from(&state.cart().state()),
    }
}

/// Add item to cart (HTMX).
///
/// Looks the product up in the catalog feed and hands it to the cart store.
/// Returns the cart count badge with a trigger to update other fragments.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let id = ProductId::new(form.product_id);
    let product = state
        .catalog()
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let snapshot = state.cart().add_item(&product);

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: snapshot.item_count,
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
///
/// Enforces the `1..=MAX_QUANTITY` range on behalf of the store; requests
/// outside it leave the cart untouched.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    if !(1..=MAX_QUANTITY).contains(&form.quantity) {
        tracing::debug!(
            quantity = form.quantity,
            "ignoring out-of-range quantity update"
        );
        return cart_items_response(&state.cart().state());
    }

    let snapshot = state
        .cart()
        .update_quantity(ProductId::new(form.product_id), form.quantity);
    cart_items_response(&snapshot)
}

/// Remove item from cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let snapshot = state.cart().remove_item(ProductId::new(form.product_id));
    cart_items_response(&snapshot)
}

/// Clear the cart (HTMX).
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Response {
    let snapshot = state.cart().clear();
    cart_items_response(&snapshot)
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.cart().state().item_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use bramble_core::{CartItem, Product, Rating};

    fn seeded_state(quantity: u32) -> AppState {
        let state = AppState::new(StorefrontConfig::default());
        let product = Product {
            id: ProductId::new(1),
            title: "Backpack".to_string(),
            price: "29.99".parse().unwrap(),
            description: String::new(),
            category: "bags".to_string(),
            image: String::new(),
            rating: Rating {
                rate: 4.0,
                count: 3,
            },
        };
        state.cart().add_item(&product);
        state.cart().update_quantity(product.id, quantity);
        state
    }

    #[tokio::test]
    async fn test_update_route_enforces_the_quantity_range() {
        // The store itself does not clamp; this layer is the enforcing
        // caller, so out-of-range requests leave the cart untouched.
        let state = seeded_state(5);

        let form = UpdateCartForm {
            product_id: 1,
            quantity: 100,
        };
        let response = update(State(state.clone()), Form(form)).await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(state.cart().item_quantity(ProductId::new(1)), 5);

        let form = UpdateCartForm {
            product_id: 1,
            quantity: 0,
        };
        update(State(state.clone()), Form(form)).await;
        assert_eq!(state.cart().item_quantity(ProductId::new(1)), 5);

        let form = UpdateCartForm {
            product_id: 1,
            quantity: MAX_QUANTITY,
        };
        update(State(state.clone()), Form(form)).await;
        assert_eq!(
            state.cart().item_quantity(ProductId::new(1)),
            MAX_QUANTITY
        );
    }

    #[tokio::test]
    async fn test_remove_route_fires_cart_updated_trigger() {
        let state = seeded_state(2);

        let form = RemoveFromCartForm { product_id: 1 };
        let response = remove(State(state.clone()), Form(form)).await;
        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            "cart-updated"
        );
        assert!(!state.cart().contains(ProductId::new(1)));
    }

    fn item(id: i64, price: &str, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: price.parse().unwrap(),
            image: String::new(),
            category: "misc".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_cart_view_formats_totals() {
        let state = CartState::from_items(vec![item(1, "29.99", 2), item(2, "19.99", 1)]);
        let view = CartView::from(&state);

        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$79.97");
        assert_eq!(view.tax, "$6.40");
        assert_eq!(view.total, "$86.37");
        assert_eq!(view.items[0].line_total, "$59.98");
    }

    #[test]
    fn test_cart_view_quantity_bounds() {
        let state = CartState::from_items(vec![item(1, "1.00", 1), item(2, "1.00", MAX_QUANTITY)]);
        let view = CartView::from(&state);

        assert!(view.items[0].at_min);
        assert!(!view.items[0].at_max);
        assert_eq!(view.items[0].dec_quantity, 0);
        assert_eq!(view.items[0].inc_quantity, 2);

        assert!(view.items[1].at_max);
        assert_eq!(view.items[1].inc_quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&CartState::empty());
        assert!(view.is_empty());
        assert_eq!(view.subtotal, "$0.00");
    }
}
