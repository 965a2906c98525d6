//! Checkout route handlers.
//!
//! The checkout pages render the phases of the [`CheckoutFlow`] state
//! machine. Entering the form with an empty cart redirects to the cart page;
//! the guard runs once per entry, not reactively mid-flow. While the
//! simulated payment runs, the processing page polls `/checkout/status`
//! until it is redirected to the confirmation page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use bramble_core::{CheckoutForm, OrderSummary, compute_totals, format_usd};

use crate::checkout::{CheckoutPhase, SubmitOutcome};
use crate::filters;
use crate::state::AppState;

// =============================================================================
// View Data
// =============================================================================

/// Order sidebar display data (form page).
#[derive(Clone)]
pub struct OrderSidebarView {
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// A line on the confirmation page.
#[derive(Clone)]
pub struct OrderItemView {
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Confirmation page display data.
#[derive(Clone)]
pub struct OrderSummaryView {
    pub order_id: String,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city_line: String,
    pub card_type: String,
    pub card_number: String,
}

impl From<&OrderSummary> for OrderSummaryView {
    fn from(summary: &OrderSummary) -> Self {
        let address = &summary.shipping_address;
        Self {
            order_id: summary.order_id.clone(),
            items: summary
                .items
                .iter()
                .map(|item| OrderItemView {
                    title: item.title.clone(),
                    image: item.image.clone(),
                    quantity: item.quantity,
                    line_total: format_usd(item.line_total()),
                })
                .collect(),
            subtotal: format_usd(summary.subtotal),
            tax: format_usd(summary.tax),
            total: format_usd(summary.total),
            full_name: format!("{} {}", address.first_name, address.last_name),
            email: address.email.clone(),
            address: address.address.clone(),
            city_line: format!("{}, {} {}", address.city, address.state, address.zip_code),
            card_type: summary.payment_method.card_type.clone(),
            card_number: summary.payment_method.card_number.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout form page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutFormTemplate {
    pub order: OrderSidebarView,
}

/// Payment processing page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/processing.html")]
pub struct ProcessingTemplate {}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub order: OrderSummaryView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page for the current phase.
///
/// A completed flow is reset first: re-entering checkout after an order
/// starts a fresh machine at the form, where the empty-cart guard redirects
/// (the cart having been cleared by the completed order).
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Response {
    state.checkout().reset_if_complete();

    match state.checkout().phase() {
        CheckoutPhase::Processing => ProcessingTemplate {}.into_response(),
        CheckoutPhase::Success(_) | CheckoutPhase::Form => {
            let snapshot = state.cart().state();
            if snapshot.is_empty() {
                // Empty-cart entry guard.
                return Redirect::to("/cart").into_response();
            }

            let totals = compute_totals(&snapshot.items);
            CheckoutFormTemplate {
                order: OrderSidebarView {
                    item_count: snapshot.item_count,
                    subtotal: format_usd(totals.subtotal),
                    tax: format_usd(totals.tax),
                    total: format_usd(totals.total),
                },
            }
            .into_response()
        }
    }
}

/// Submit the checkout form and start the simulated payment.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<CheckoutForm>,
) -> Response {
    match state.checkout().submit(form) {
        SubmitOutcome::Started => ProcessingTemplate {}.into_response(),
        SubmitOutcome::EmptyCart => Redirect::to("/cart").into_response(),
        SubmitOutcome::AlreadyInFlight => Redirect::to("/checkout").into_response(),
    }
}

/// Poll the payment simulation (HTMX).
///
/// Answers 204 while processing; once the order is confirmed, redirects the
/// poller to the confirmation page.
#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Response {
    match state.checkout().phase() {
        CheckoutPhase::Processing => StatusCode::NO_CONTENT.into_response(),
        CheckoutPhase::Success(_) => (
            AppendHeaders([("HX-Redirect", "/checkout/success")]),
            StatusCode::NO_CONTENT,
        )
            .into_response(),
        CheckoutPhase::Form => (
            AppendHeaders([("HX-Redirect", "/cart")]),
            StatusCode::NO_CONTENT,
        )
            .into_response(),
    }
}

/// Display the order confirmation page.
#[instrument(skip(state))]
pub async fn success(State(state): State<AppState>) -> Response {
    match state.checkout().phase() {
        CheckoutPhase::Success(summary) => SuccessTemplate {
            order: OrderSummaryView::from(summary.as_ref()),
        }
        .into_response(),
        CheckoutPhase::Form | CheckoutPhase::Processing => {
            Redirect::to("/checkout").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use bramble_core::{CartItem, OrderTotals, ProductId};

    #[tokio::test]
    async fn test_show_with_empty_cart_redirects_to_cart() {
        let state = AppState::new(StorefrontConfig::default());

        let response = show(State(state)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/cart",
            "empty-cart entry must redirect instead of rendering the form"
        );
    }

    #[tokio::test]
    async fn test_submit_with_empty_cart_redirects_to_cart() {
        let state = AppState::new(StorefrontConfig::default());

        let response = submit(State(state), Form(CheckoutForm::default())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/cart");
    }

    #[tokio::test]
    async fn test_status_outside_a_flow_redirects_the_poller() {
        let state = AppState::new(StorefrontConfig::default());

        let response = status(State(state)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/cart");
    }

    #[tokio::test]
    async fn test_success_without_an_order_redirects_to_checkout() {
        let state = AppState::new(StorefrontConfig::default());

        let response = success(State(state)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/checkout");
    }

    #[test]
    fn test_order_summary_view_formats_fields() {
        let items = vec![CartItem {
            id: ProductId::new(1),
            title: "Backpack".to_string(),
            price: "29.99".parse().unwrap(),
            image: "https://example.test/1.jpg".to_string(),
            category: "bags".to_string(),
            quantity: 2,
        }];
        let totals = OrderTotals {
            subtotal: "59.98".parse().unwrap(),
            tax: "4.7984".parse().unwrap(),
            total: "64.7784".parse().unwrap(),
        };
        let form = CheckoutForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.test".to_string(),
            address: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "E1 6AN".to_string(),
            card_number: "4111111111111111".to_string(),
            ..CheckoutForm::default()
        };
        let summary = OrderSummary::build(
            "ORD-1700000000000-ABC123XYZ".to_string(),
            items,
            &totals,
            &form,
        );

        let view = OrderSummaryView::from(&summary);
        assert_eq!(view.order_id, "ORD-1700000000000-ABC123XYZ");
        assert_eq!(view.full_name, "Ada Lovelace");
        assert_eq!(view.city_line, "London, LDN E1 6AN");
        assert_eq!(view.subtotal, "$59.98");
        assert_eq!(view.tax, "$4.80");
        assert_eq!(view.total, "$64.78");
        assert_eq!(view.items[0].line_total, "$59.98");
        assert_eq!(view.card_number, "**** **** **** 1111");
        assert_eq!(view.card_type, "Visa");
    }
}
