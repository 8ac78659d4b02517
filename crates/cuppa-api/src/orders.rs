//! Order endpoints: configure, checkout, status.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use cuppa_core::Result;
use cuppa_core::error::InvalidInputError;

use crate::client::{ApiClient, required};
use crate::envelope::Envelope;
use crate::validate::{validate_checkout_session, validate_order};

const CONFIGURE: &str = "/api/core/v1/orders/configure";

/// One coffee preference within an order, as sent to the API.
#[derive(Clone, Debug, Serialize)]
pub struct OrderLineItem {
    pub quantity_kg: u32,
    pub grind_type: String,
    pub brewing_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A line item as returned by the API. Quantities arrive as decimal
/// strings.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OrderLineItemRecord {
    pub id: String,
    pub quantity_kg: String,
    pub grind_type: String,
    pub brewing_method: String,
    #[serde(default)]
    pub notes: String,
}

impl OrderLineItemRecord {
    /// The quantity in kilograms; zero when unparsable.
    pub fn quantity(&self) -> f64 {
        self.quantity_kg.parse().unwrap_or(0.0)
    }
}

/// A coffee order.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub tier: String,
    pub total_quantity_kg: String,
    #[serde(default)]
    pub line_items: Vec<OrderLineItemRecord>,
    pub status: String,
    #[serde(default)]
    pub expected_shipment_date: Option<String>,
    #[serde(default)]
    pub created_on: String,
}

impl Order {
    /// Total quantity in kilograms; zero when unparsable.
    pub fn total_quantity(&self) -> f64 {
        self.total_quantity_kg.parse().unwrap_or(0.0)
    }

    /// True once the backend has confirmed payment.
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}

/// Request body for creating a draft order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub total_quantity_kg: u32,
    pub line_items: Vec<OrderLineItem>,
}

/// A Stripe checkout session for an order.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub order_id: String,
}

impl ApiClient {
    /// Create a new draft order with coffee preferences (requires auth).
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        let response = self
            .execute(Method::POST, CONFIGURE, Some(request), true)
            .await?;
        let envelope: Envelope<Order> = required(&response)?;

        validate_order(&envelope.data).map_err(|e| InvalidInputError::Response {
            message: format!("invalid order response: {e}"),
        })?;
        Ok(envelope.data)
    }

    /// Create a Stripe checkout session for an order (requires auth).
    pub async fn create_checkout_session(&self, order_id: &str) -> Result<CheckoutSession> {
        let path = format!("/api/core/v1/orders/{order_id}/checkout");
        let response = self.execute_empty(Method::POST, &path, true).await?;
        let envelope: Envelope<CheckoutSession> = required(&response)?;

        validate_checkout_session(&envelope.data).map_err(|e| InvalidInputError::Response {
            message: format!("invalid checkout session: {e}"),
        })?;
        Ok(envelope.data)
    }

    /// Fetch a specific order by ID (requires auth).
    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let path = format!("/api/core/v1/orders/{order_id}");
        let response = self.execute_empty(Method::GET, &path, true).await?;
        let envelope: Envelope<Order> = required(&response)?;

        validate_order(&envelope.data).map_err(|e| InvalidInputError::Response {
            message: format!("invalid order response: {e}"),
        })?;
        Ok(envelope.data)
    }
}
