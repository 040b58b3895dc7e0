use crate::domain::money::{Money, Rate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Offer,
    Image,
    System,
    PaymentRequest,
}

/// One entry in a request's negotiation chat.
///
/// Each request has exactly one conversation, keyed by the request id.
/// Offer messages carry the proposed terms alongside the rendered text;
/// system messages have no sender.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Message {
    pub id: u64,
    pub request_id: u64,
    pub sender: Option<u64>,
    pub kind: MessageKind,
    pub content: String,
    pub offer_rate: Option<Rate>,
    pub offer_days: Option<u32>,
    pub is_read: bool,
}

impl Message {
    pub fn text(id: u64, request_id: u64, sender: u64, content: String) -> Self {
        Self {
            id,
            request_id,
            sender: Some(sender),
            kind: MessageKind::Text,
            content,
            offer_rate: None,
            offer_days: None,
            is_read: false,
        }
    }

    /// An image attachment; `url` points into external object storage.
    pub fn image(id: u64, request_id: u64, sender: u64, url: String) -> Self {
        Self {
            id,
            request_id,
            sender: Some(sender),
            kind: MessageKind::Image,
            content: url,
            offer_rate: None,
            offer_days: None,
            is_read: false,
        }
    }

    pub fn offer(
        id: u64,
        request_id: u64,
        sender: u64,
        rate: Rate,
        days: u32,
        unit: &str,
    ) -> Self {
        Self {
            id,
            request_id,
            sender: Some(sender),
            kind: MessageKind::Offer,
            content: format!("Offer: ${rate}/{unit} for {days} days"),
            offer_rate: Some(rate),
            offer_days: Some(days),
            is_read: false,
        }
    }

    pub fn system(id: u64, request_id: u64, content: String) -> Self {
        Self {
            id,
            request_id,
            sender: None,
            kind: MessageKind::System,
            content,
            offer_rate: None,
            offer_days: None,
            is_read: false,
        }
    }

    pub fn payment_request(id: u64, request_id: u64, sender: u64, total: Money) -> Self {
        Self {
            id,
            request_id,
            sender: Some(sender),
            kind: MessageKind::PaymentRequest,
            content: format!("Payment requested: ${total} total"),
            offer_rate: None,
            offer_days: None,
            is_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_offer_message_renders_terms() {
        let rate = Rate::new(dec!(5.50)).unwrap();
        let message = Message::offer(7, 100, 20, rate, 4, "day");
        assert_eq!(message.kind, MessageKind::Offer);
        assert_eq!(message.content, "Offer: $5.5/day for 4 days");
        assert_eq!(message.offer_rate, Some(rate));
        assert_eq!(message.offer_days, Some(4));
        assert!(!message.is_read);
    }

    #[test]
    fn test_system_message_has_no_sender() {
        let message = Message::system(8, 100, "Request accepted by owner".to_string());
        assert_eq!(message.sender, None);
        assert_eq!(message.kind, MessageKind::System);
    }

    #[test]
    fn test_payment_request_renders_total() {
        let total = Money::new(dec!(22.0)).unwrap();
        let message = Message::payment_request(9, 100, 10, total);
        assert_eq!(message.content, "Payment requested: $22 total");
        assert_eq!(message.kind, MessageKind::PaymentRequest);
    }
}
