use std::str::FromStr;

use crate::app::{QuotaStrategy, StripeCfg};
use crate::errors::ContentScriptError;
use crate::models::identity::Identity;

/// Checkout session created at Stripe and the hosted page to send the caller to.
pub struct CheckoutRedirect {
    pub session_id: String,
    pub url: String,
}

/// Hosted Stripe checkout that upgrades an identity to the pro plan.
pub struct Checkout<'a> {
    pub origin: &'a str,
    pub strategy: QuotaStrategy,
    pub identity: Option<&'a Identity>,
}

impl<'a> Checkout<'a> {
    /// With the cookie strategy nothing can reach the visitor's session from a webhook,
    /// so Stripe redirects back through `/api/checkout-success` to confirm payment.
    pub fn success_url(&self) -> String {
        match self.strategy {
            QuotaStrategy::Cookie => format!(
                "{}/api/checkout-success?session_id={{CHECKOUT_SESSION_ID}}",
                self.origin
            ),
            QuotaStrategy::Metadata => format!("{}/generate?paid=1", self.origin),
        }
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/generate?canceled=1", self.origin)
    }

    pub fn client_reference_id(&self) -> Option<&str> {
        self.identity.and_then(|identity| identity.user_id())
    }

    pub async fn build_stripe_url(&self, stripe_cfg: &StripeCfg) -> Result<CheckoutRedirect, ContentScriptError> {
        let client = stripe_cfg.client();
        let success_url = self.success_url();
        let cancel_url = self.cancel_url();

        let mut params = stripe::CreateCheckoutSession::new();
        params.mode = Some(stripe::CheckoutSessionMode::Subscription);
        params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(stripe_cfg.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);
        params.client_reference_id = self.client_reference_id();

        let checkout_session = stripe::CheckoutSession::create(&client, params).await?;

        let url = checkout_session
            .url
            .ok_or_else(|| ContentScriptError::InternalServerError("Checkout session has no url".to_string()))?;

        Ok(CheckoutRedirect {
            session_id: checkout_session.id.to_string(),
            url,
        })
    }

    /// Whether the checkout session `session_id` has been paid for.
    pub async fn is_paid(stripe_cfg: &StripeCfg, session_id: &str) -> Result<bool, ContentScriptError> {
        let client = stripe_cfg.client();
        let session_id = stripe::CheckoutSessionId::from_str(session_id)
            .map_err(|e| ContentScriptError::BadRequest(format!("Invalid checkout session id: {}", e)))?;

        let session = stripe::CheckoutSession::retrieve(&client, &session_id, &[]).await?;

        Ok(matches!(
            session.payment_status,
            stripe::CheckoutSessionPaymentStatus::Paid | stripe::CheckoutSessionPaymentStatus::NoPaymentRequired
        ))
    }
}
