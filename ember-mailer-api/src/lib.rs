//! Wire contract between the storefront and the mail relay.
//!
//! Monetary amounts travel as decimal strings (`"12.50"`) so no caller ever
//! round-trips money through floating point.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/send-newsletter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendNewsletterPayload {
    pub email: String,
}

/// One itemized row of an order confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationItem {
    pub title: String,
    pub quantity: i32,
    /// Unit price at placement time, as a decimal string.
    pub price: String,
}

/// Body of `POST /api/send-confirmation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmationPayload {
    pub email: String,
    pub name: String,
    pub order_id: Uuid,
    /// Grand total at placement time, as a decimal string.
    pub total: String,
    pub items: Vec<ConfirmationItem>,
}

/// Success body returned by both relay routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayAccepted {
    pub success: bool,
}

/// Shape check shared by subscribe and relay validation: one `@`, no
/// whitespace, and a dotted domain with a non-empty label on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@mail.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada@example."));
        assert!(!is_valid_email("ada bee@example.com"));
    }

    #[test]
    fn confirmation_payload_uses_camel_case_order_id() {
        let payload = SendConfirmationPayload {
            email: "ada@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
            order_id: Uuid::nil(),
            total: "25.00".to_string(),
            items: vec![ConfirmationItem {
                title: "Garlic Naan".to_string(),
                quantity: 2,
                price: "10.00".to_string(),
            }],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("orderId").is_some());
        assert!(value.get("order_id").is_none());
        assert_eq!(value["items"][0]["price"], "10.00");
    }
}
