use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Succeeded,
    Declined,
}

/// A single charge attempt for a booking. The booking id doubles as the
/// idempotency key: retrying the same booking must not charge twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: Uuid,
    pub amount_cents: i32,
    pub currency: String,
    pub payment_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub status: PaymentStatus,
    /// Provider reference for a successful charge (e.g. pay_<booking>).
    pub reference: Option<String>,
    pub decline_reason: Option<String>,
}

impl PaymentOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == PaymentStatus::Succeeded
    }
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Charge the given amount. Must be idempotent per booking id.
    async fn process(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

/// Deterministic stand-in for a real provider. Tokens ending in
/// `-declined` fail, everything else succeeds with a reference derived
/// from the booking id, so replays produce the same outcome.
pub struct MockPaymentAdapter;

#[async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn process(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentOutcome, Box<dyn std::error::Error + Send + Sync>> {
        if request.payment_token.ends_with("-declined") {
            tracing::info!(booking_id = %request.booking_id, "mock payment declined");
            return Ok(PaymentOutcome {
                status: PaymentStatus::Declined,
                reference: None,
                decline_reason: Some("card declined".to_string()),
            });
        }

        tracing::info!(
            booking_id = %request.booking_id,
            amount_cents = request.amount_cents,
            "mock payment captured"
        );
        Ok(PaymentOutcome {
            status: PaymentStatus::Succeeded,
            reference: Some(format!("pay_{}", request.booking_id.simple())),
            decline_reason: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn declined_token_is_rejected() {
        let adapter = MockPaymentAdapter;
        let req = PaymentRequest {
            booking_id: Uuid::new_v4(),
            amount_cents: 2400,
            currency: "USD".to_string(),
            payment_token: "tok-visa-declined".to_string(),
        };
        let outcome = adapter.process(&req).await.unwrap();
        assert_eq!(outcome.status, PaymentStatus::Declined);
        assert!(outcome.reference.is_none());
    }

    #[tokio::test]
    async fn replay_yields_identical_reference() {
        let adapter = MockPaymentAdapter;
        let req = PaymentRequest {
            booking_id: Uuid::new_v4(),
            amount_cents: 2400,
            currency: "USD".to_string(),
            payment_token: "tok-visa".to_string(),
        };
        let first = adapter.process(&req).await.unwrap();
        let second = adapter.process(&req).await.unwrap();
        assert!(first.succeeded());
        assert_eq!(first.reference, second.reference);
    }
}
