//! Subscription endpoints: plans, lifecycle actions, preferences.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use cuppa_core::error::InvalidInputError;
use cuppa_core::{Error, Result};

use crate::client::{ApiClient, required};
use crate::envelope::Envelope;
use crate::orders::OrderLineItem;
use crate::validate::validate_subscription;

const SUBSCRIPTIONS: &str = "/api/core/v1/subscriptions";

/// A user's subscription.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Subscription {
    pub id: String,
    pub tier: String,
    pub status: String,
    #[serde(default)]
    pub stripe_payment_link: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_on: String,
    /// Decimal string; only present on the preferences endpoint.
    #[serde(default)]
    pub default_quantity: String,
    #[serde(default)]
    pub default_preferences: Vec<SubscriptionPreference>,
}

impl Subscription {
    /// Default monthly quantity in whole kilograms, rounded to nearest.
    pub fn total_quantity(&self) -> u32 {
        parse_quantity(&self.default_quantity)
    }

    /// True while the subscription is active.
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// A default coffee preference attached to a subscription.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SubscriptionPreference {
    pub id: String,
    pub quantity: String,
    pub grind_type: String,
    pub brewing_method: String,
    #[serde(default)]
    pub notes: String,
}

impl SubscriptionPreference {
    /// Quantity in whole kilograms, rounded to nearest.
    pub fn quantity(&self) -> u32 {
        parse_quantity(&self.quantity)
    }
}

fn parse_quantity(raw: &str) -> u32 {
    raw.parse::<f64>()
        .map(|quantity| quantity.round().max(0.0) as u32)
        .unwrap_or(0)
}

/// A purchasable plan: either a subscription tier or a one-time product.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AvailablePlan {
    pub id: String,
    pub tier: String,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub billing_period: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_subscription: bool,
    #[serde(default)]
    pub is_active: bool,
}

impl AvailablePlan {
    /// Price per kilogram; zero when unparsable.
    pub fn price_per_kg(&self) -> f64 {
        self.price.parse().unwrap_or(0.0)
    }
}

/// Request body for updating subscription preferences.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateSubscriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<OrderLineItem>>,
}

impl ApiClient {
    /// List the user's subscriptions (requires auth).
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let response = self
            .execute_empty(Method::GET, SUBSCRIPTIONS, true)
            .await?;
        let envelope: Envelope<Vec<Subscription>> = required(&response)?;

        for (index, subscription) in envelope.data.iter().enumerate() {
            validate_subscription(subscription).map_err(|e| InvalidInputError::Response {
                message: format!("invalid subscription at index {index}: {e}"),
            })?;
        }
        Ok(envelope.data)
    }

    /// List the active subscription tiers available for purchase.
    pub async fn available_subscriptions(&self) -> Result<Vec<AvailablePlan>> {
        self.available_plans(true).await
    }

    /// List the active one-time purchase products.
    pub async fn available_products(&self) -> Result<Vec<AvailablePlan>> {
        self.available_plans(false).await
    }

    async fn available_plans(&self, subscriptions: bool) -> Result<Vec<AvailablePlan>> {
        let path = format!("{SUBSCRIPTIONS}/available?is_subscription={subscriptions}");
        let response = self.execute_empty(Method::GET, &path, false).await?;
        let envelope: Envelope<Vec<AvailablePlan>> = required(&response)?;

        Ok(envelope
            .data
            .into_iter()
            .filter(|plan| plan.is_active)
            .collect())
    }

    /// Pricing information for a specific tier.
    pub async fn subscription_pricing(&self, tier: &str) -> Result<AvailablePlan> {
        let plans = self.available_subscriptions().await?;
        plans.into_iter().find(|plan| plan.tier == tier).ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::Response {
                message: format!("pricing not found for tier: {tier}"),
            })
        })
    }

    /// Fetch a subscription with its default preferences (requires auth).
    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        let path = format!("{SUBSCRIPTIONS}/{subscription_id}/preferences");
        let response = self.execute_empty(Method::GET, &path, true).await?;
        let envelope: Envelope<Subscription> = required(&response)?;

        validate_subscription(&envelope.data).map_err(|e| InvalidInputError::Response {
            message: format!("invalid subscription response: {e}"),
        })?;
        Ok(envelope.data)
    }

    /// Pause an active subscription (requires auth).
    pub async fn pause_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.subscription_action(subscription_id, "pause").await
    }

    /// Resume a paused subscription (requires auth).
    pub async fn resume_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.subscription_action(subscription_id, "resume").await
    }

    /// Cancel a subscription (requires auth).
    pub async fn cancel_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.subscription_action(subscription_id, "cancel").await
    }

    async fn subscription_action(
        &self,
        subscription_id: &str,
        action: &str,
    ) -> Result<Subscription> {
        let path = format!("{SUBSCRIPTIONS}/{subscription_id}/{action}");
        let response = self.execute_empty(Method::POST, &path, true).await?;
        let envelope: Envelope<Subscription> = required(&response)?;
        Ok(envelope.data)
    }

    /// Update a subscription's quantity and default preferences (requires
    /// auth).
    pub async fn update_subscription(
        &self,
        subscription_id: &str,
        request: &UpdateSubscriptionRequest,
    ) -> Result<Subscription> {
        let path = format!("{SUBSCRIPTIONS}/{subscription_id}/preferences");
        let response = self.execute(Method::PATCH, &path, Some(request), true).await?;
        let envelope: Envelope<Subscription> = required(&response)?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_rounds_to_nearest() {
        assert_eq!(parse_quantity("2.5"), 3);
        assert_eq!(parse_quantity("2.4"), 2);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("abc"), 0);
    }
}
