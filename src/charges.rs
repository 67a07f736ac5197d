use anyhow::Context;
use axum::async_trait;
use serde::Deserialize;

/// External card-payment collaborator. The core only ever asks for a charge
/// intent and hands the returned secret to the client.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    /// `amount` is in the currency's minor unit (cents for usd).
    async fn create_intent(&self, amount: i64, currency: &str) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct StripeCharges {
    http: reqwest::Client,
    secret_key: String,
}

impl StripeCharges {
    pub fn new(secret_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    client_secret: String,
}

#[async_trait]
impl ChargeGateway for StripeCharges {
    async fn create_intent(&self, amount: i64, currency: &str) -> anyhow::Result<String> {
        let intent: PaymentIntent = self
            .http
            .post("https://api.stripe.com/v1/payment_intents")
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.to_string()),
                ("currency", currency.to_string()),
                ("payment_method_types[]", "card".to_string()),
            ])
            .send()
            .await
            .context("stripe payment_intents request")?
            .error_for_status()
            .context("stripe payment_intents status")?
            .json()
            .await
            .context("stripe payment_intents body")?;
        Ok(intent.client_secret)
    }
}
