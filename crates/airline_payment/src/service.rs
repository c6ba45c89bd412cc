// --- File: crates/airline_payment/src/service.rs ---
//! The seam between payment bookkeeping and whoever actually moves the money.

use airline_common::BoxFuture;
use tracing::info;
use uuid::Uuid;

use crate::error::PaymentError;

/// What the gateway is asked to charge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub payment_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChargeOutcome {
    Approved,
    Declined(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefundReceipt {
    pub refund_id: String,
}

/// Payment provider operations.
pub trait PaymentGateway: Send + Sync {
    fn charge(&self, request: ChargeRequest) -> BoxFuture<'_, ChargeOutcome, PaymentError>;

    fn refund(&self, payment_id: &str, amount: f64) -> BoxFuture<'_, RefundReceipt, PaymentError>;
}

/// `PREFIX-` followed by twelve uppercase hex digits.
pub fn generate_reference(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &hex[..12])
}

/// Approves every charge and refund immediately.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway;

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, request: ChargeRequest) -> BoxFuture<'_, ChargeOutcome, PaymentError> {
        Box::pin(async move {
            info!(
                "Simulated charge {} of {} {} via {}",
                request.payment_id, request.amount, request.currency, request.payment_method
            );
            Ok(ChargeOutcome::Approved)
        })
    }

    fn refund(&self, payment_id: &str, amount: f64) -> BoxFuture<'_, RefundReceipt, PaymentError> {
        let payment_id = payment_id.to_string();
        Box::pin(async move {
            let refund_id = generate_reference("REF");
            info!("Simulated refund {} of {} for {}", refund_id, amount, payment_id);
            Ok(RefundReceipt { refund_id })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_have_fixed_shape() {
        let reference = generate_reference("PAY");
        assert_eq!(reference.len(), 16);
        assert!(reference.starts_with("PAY-"));
        assert!(reference[4..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_ne!(reference, generate_reference("PAY"));
    }

    #[tokio::test]
    async fn simulated_gateway_approves() {
        let gateway = SimulatedGateway;
        let outcome = gateway
            .charge(ChargeRequest {
                payment_id: "PAY-000000000000".to_string(),
                amount: 10.0,
                currency: "USD".to_string(),
                payment_method: "card".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, ChargeOutcome::Approved);

        let receipt = gateway.refund("PAY-000000000000", 10.0).await.unwrap();
        assert!(receipt.refund_id.starts_with("REF-"));
    }
}
