//! Response contract validation.
//!
//! Decoded payloads are checked against length, range, and URL constraints
//! before they reach callers. A violation indicates a backend contract
//! problem, so failures surface as invalid-input errors rather than user
//! errors.

use url::Url;

use crate::orders::{CheckoutSession, Order};
use crate::subscriptions::Subscription;

const MAX_ID_LEN: usize = 255;
const MAX_TIER_LEN: usize = 100;
const MAX_STATUS_LEN: usize = 50;
const MAX_QUANTITY: u32 = 1000;
const MAX_LINE_ITEMS: usize = 50;

/// Empty URLs are allowed for optional fields; anything else must be
/// http(s).
fn validate_url(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }

    let parsed = Url::parse(value).map_err(|e| format!("invalid URL format: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("URL must use http or https scheme, got: {other}")),
    }
}

fn validate_len(value: &str, max: usize, field: &str) -> Result<(), String> {
    if value.len() > max {
        return Err(format!("{field} exceeds maximum length of {max} characters"));
    }
    Ok(())
}

pub(crate) fn validate_subscription(subscription: &Subscription) -> Result<(), String> {
    validate_len(&subscription.id, MAX_ID_LEN, "subscription ID")?;
    validate_len(&subscription.tier, MAX_TIER_LEN, "tier")?;
    validate_len(&subscription.status, MAX_STATUS_LEN, "status")?;

    validate_url(&subscription.stripe_payment_link)
        .map_err(|e| format!("invalid payment link: {e}"))?;

    let quantity = subscription.total_quantity();
    if quantity > MAX_QUANTITY {
        return Err(format!(
            "invalid quantity: {quantity} (must be between 0 and {MAX_QUANTITY})"
        ));
    }

    Ok(())
}

pub(crate) fn validate_order(order: &Order) -> Result<(), String> {
    validate_len(&order.id, MAX_ID_LEN, "order ID")?;
    validate_len(&order.tier, MAX_TIER_LEN, "tier")?;
    validate_len(&order.status, MAX_STATUS_LEN, "status")?;

    let quantity = order.total_quantity();
    if !(0.0..=MAX_QUANTITY as f64).contains(&quantity) {
        return Err(format!(
            "invalid order quantity: {quantity} (must be between 0 and {MAX_QUANTITY})"
        ));
    }

    if order.line_items.len() > MAX_LINE_ITEMS {
        return Err(format!(
            "too many line items: {} (maximum {MAX_LINE_ITEMS})",
            order.line_items.len()
        ));
    }

    Ok(())
}

pub(crate) fn validate_checkout_session(session: &CheckoutSession) -> Result<(), String> {
    if session.checkout_url.is_empty() {
        return Err("checkout URL is required".to_string());
    }
    validate_url(&session.checkout_url).map_err(|e| format!("invalid checkout URL: {e}"))?;

    validate_len(&session.session_id, MAX_ID_LEN, "session ID")?;
    validate_len(&session.order_id, MAX_ID_LEN, "order ID")?;

    Ok(())
}
