//! End-to-end checkout flows over the cart store and checkout state machine.
//!
//! These tests run on a paused tokio clock so the 3-second payment
//! simulation completes instantly and deterministically.

use std::time::Duration;

use bramble_core::{CheckoutForm, compute_totals, format_usd};
use bramble_integration_tests::test_product;
use bramble_storefront::cart::CartStore;
use bramble_storefront::checkout::{
    CheckoutFlow, CheckoutPhase, PAYMENT_PROCESSING_DELAY, SubmitOutcome,
};

fn checkout_form() -> CheckoutForm {
    CheckoutForm {
        first_name: "Margaret".to_string(),
        last_name: "Hamilton".to_string(),
        email: "margaret@example.test".to_string(),
        address: "17 Apollo Drive".to_string(),
        city: "Cambridge".to_string(),
        state: "MA".to_string(),
        zip_code: "02139".to_string(),
        card_number: "4000 0566 5566 5556".to_string(),
        card_name: "Margaret Hamilton".to_string(),
        expiry_date: "07/28".to_string(),
        cvv: "321".to_string(),
    }
}

/// Advance past the payment delay and let the completion task run.
async fn run_payment_simulation() {
    tokio::time::advance(PAYMENT_PROCESSING_DELAY).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Full Flow
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_full_checkout_flow() {
    let cart = CartStore::new();
    let backpack = test_product(1, "Trail Backpack", "29.99");
    let flask = test_product(2, "Steel Flask", "19.99");

    cart.add_item(&backpack);
    cart.add_item(&backpack);
    cart.add_item(&flask);
    let snapshot = cart.state();
    assert_eq!(snapshot.item_count, 3);

    let flow = CheckoutFlow::new(cart.clone());
    assert_eq!(flow.submit(checkout_form()), SubmitOutcome::Started);
    assert!(flow.phase().is_processing());

    // The phase stays Processing for the entire delay, however often it is
    // polled, and the cart is untouched during the window.
    for _ in 0..5 {
        tokio::time::advance(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert!(flow.phase().is_processing());
    }
    assert_eq!(cart.state().item_count, 3);

    tokio::time::advance(Duration::from_millis(500)).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    let CheckoutPhase::Success(summary) = flow.phase() else {
        panic!("expected success after the payment delay");
    };

    // Order built from the frozen snapshot, while the live cart is now empty.
    assert!(cart.state().is_empty());
    assert_eq!(summary.items, snapshot.items);
    assert_eq!(format_usd(summary.subtotal), "$79.97");
    assert_eq!(format_usd(summary.tax), "$6.40");
    assert_eq!(format_usd(summary.total), "$86.37");

    // Totals in the summary agree with recomputing over its own items.
    let recomputed = compute_totals(&summary.items);
    assert_eq!(summary.subtotal, recomputed.subtotal);
    assert_eq!(summary.total, recomputed.total);

    assert_eq!(summary.shipping_address.first_name, "Margaret");
    assert_eq!(summary.shipping_address.zip_code, "02139");
    assert_eq!(summary.payment_method.card_type, "Visa");
    assert_eq!(summary.payment_method.card_number, "**** **** **** 5556");
}

#[tokio::test(start_paused = true)]
async fn test_order_id_shape() {
    let cart = CartStore::new();
    cart.add_item(&test_product(1, "Trail Backpack", "29.99"));
    let flow = CheckoutFlow::new(cart);
    flow.submit(checkout_form());
    run_payment_simulation().await;

    let CheckoutPhase::Success(summary) = flow.phase() else {
        panic!("expected success");
    };

    let parts: Vec<&str> = summary.order_id.splitn(3, '-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "ORD");
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 9);
    assert!(
        parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_cart_cannot_start_checkout() {
    let cart = CartStore::new();
    let flow = CheckoutFlow::new(cart);

    assert_eq!(flow.submit(checkout_form()), SubmitOutcome::EmptyCart);
    assert!(matches!(flow.phase(), CheckoutPhase::Form));
}

#[tokio::test(start_paused = true)]
async fn test_mid_flight_cart_mutations_do_not_reach_the_order() {
    let cart = CartStore::new();
    cart.add_item(&test_product(1, "Trail Backpack", "29.99"));
    let snapshot = cart.state();

    let flow = CheckoutFlow::new(cart.clone());
    flow.submit(checkout_form());

    // Another actor empties and refills the cart mid-processing; the flow
    // never reads the cart again after capture.
    cart.clear();
    cart.add_item(&test_product(9, "Impostor Lamp", "999.00"));

    run_payment_simulation().await;

    let CheckoutPhase::Success(summary) = flow.phase() else {
        panic!("expected success");
    };
    assert_eq!(summary.items, snapshot.items);
    // Completion clears whatever the cart held at that point.
    assert!(cart.state().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reentering_checkout_after_success_starts_fresh() {
    let cart = CartStore::new();
    cart.add_item(&test_product(1, "Trail Backpack", "29.99"));
    let flow = CheckoutFlow::new(cart.clone());
    flow.submit(checkout_form());
    run_payment_simulation().await;
    assert!(matches!(flow.phase(), CheckoutPhase::Success(_)));

    // Re-entry resets to the form; with the cart cleared by the completed
    // order, a new submit hits the empty-cart guard.
    flow.reset_if_complete();
    assert!(matches!(flow.phase(), CheckoutPhase::Form));
    assert_eq!(flow.submit(checkout_form()), SubmitOutcome::EmptyCart);

    // A second full round works once the cart has items again.
    cart.add_item(&test_product(2, "Steel Flask", "19.99"));
    assert_eq!(flow.submit(checkout_form()), SubmitOutcome::Started);
    run_payment_simulation().await;
    let CheckoutPhase::Success(summary) = flow.phase() else {
        panic!("expected second success");
    };
    assert_eq!(summary.items.len(), 1);
}
