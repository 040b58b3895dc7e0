use crate::domain::money::Money;
use crate::domain::ports::{PaymentGateway, PaymentIntent};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// An offline payment gateway that mints deterministic intents.
///
/// The real collaborator is an external payment-intent creation endpoint;
/// this adapter keeps replays self-contained. Zero-amount intents are
/// refused the way a real processor would refuse them.
#[derive(Default)]
pub struct OfflinePaymentGateway {
    counter: AtomicU64,
}

impl OfflinePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentGateway for OfflinePaymentGateway {
    async fn create_intent(&self, request_id: u64, total: Money) -> Result<PaymentIntent> {
        if total.0 == Decimal::ZERO {
            return Err(MarketError::PaymentError(format!(
                "Cannot create an intent for request {request_id} with a zero total"
            )));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("pi_{n:06}");
        Ok(PaymentIntent {
            checkout_url: format!("https://pay.campuslend.local/checkout/{request_id}/{id}"),
            id,
            amount: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_intents_are_sequential() {
        let gateway = OfflinePaymentGateway::new();
        let total = Money::new(dec!(20.0)).unwrap();

        let first = gateway.create_intent(100, total).await.unwrap();
        let second = gateway.create_intent(101, total).await.unwrap();

        assert_eq!(first.id, "pi_000001");
        assert_eq!(second.id, "pi_000002");
        assert_eq!(first.amount, total);
        assert!(first.checkout_url.contains("/100/pi_000001"));
    }

    #[tokio::test]
    async fn test_zero_total_is_refused() {
        let gateway = OfflinePaymentGateway::new();
        let total = Money::new(dec!(0.0)).unwrap();

        let result = gateway.create_intent(100, total).await;
        assert!(matches!(result, Err(MarketError::PaymentError(_))));
    }
}
