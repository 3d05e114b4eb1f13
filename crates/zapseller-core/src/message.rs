use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::SalesStrategy;

/// Who wrote a chat message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The customer.
    #[default]
    User,
    /// The virtual salesperson.
    Model,
}

/// One entry of the simulated WhatsApp conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: ChatRole,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

/// A base64 voice note recorded by the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioData {
    pub data: String,
    pub mime_type: String,
}

/// Structured order captured through the `confirmOrder` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub customer_name: String,
    pub details: String,
    pub strategy: SalesStrategy,
}

/// The normalized answer of the salesperson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub text: String,
    /// Base64 audio returned by the native-audio model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_confirmed: Option<OrderDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_without_timestamp() {
        let json = r#"{"role":"model","text":"Olá! 👋"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, ChatRole::Model);
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn test_missing_role_is_user() {
        let msg: ChatMessage = serde_json::from_str(r#"{"text":"oi"}"#).unwrap();
        assert_eq!(msg.role, ChatRole::User);
    }

    #[test]
    fn test_reply_omits_empty_fields() {
        let reply = ChatReply {
            text: "Oi".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["text"], "Oi");
        assert!(json.get("audioData").is_none());
        assert!(json.get("orderConfirmed").is_none());
    }

    #[test]
    fn test_order_details_camel_case() {
        let order = OrderDetails {
            customer_name: "Maria".into(),
            details: "Rua A, 10".into(),
            strategy: SalesStrategy::Cod,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customerName"], "Maria");
        assert_eq!(json["strategy"], "cod");
    }
}
