//! Lead temperature from the recent conversation.

use serde::Serialize;
use zapseller_core::message::ChatMessage;

const HOT_KEYWORDS: [&str; 3] = ["entrega", "preço", "comprar"];
const PRICE_KEYWORDS: [&str; 4] = ["preço", "preco", "quanto custa", "valor"];
const DELIVERY_KEYWORDS: [&str; 4] = ["entrega", "endereço", "endereco", "cep"];

/// How close a customer is to buying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Frio,
    Morno,
    Quente,
}

impl LeadStatus {
    /// Classify a conversation. Only the last three messages are scanned
    /// for buying signals.
    pub fn classify(messages: &[ChatMessage]) -> Self {
        if messages.len() <= 2 {
            return Self::Frio;
        }
        let start = messages.len().saturating_sub(3);
        let last_three = messages[start..]
            .iter()
            .map(|m| m.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        if HOT_KEYWORDS.iter().any(|k| last_three.contains(k)) {
            Self::Quente
        } else if messages.len() > 4 {
            Self::Morno
        } else {
            Self::Frio
        }
    }
}

/// Customer asked about the price.
pub fn mentions_price(text: &str) -> bool {
    let lower = text.to_lowercase();
    PRICE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Conversation reached the delivery step.
pub fn mentions_delivery(text: &str) -> bool {
    let lower = text.to_lowercase();
    DELIVERY_KEYWORDS.iter().any(|k| lower.contains(k))
}
