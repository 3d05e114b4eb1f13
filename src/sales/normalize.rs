//! Fold typed provider parts into a single [`ChatReply`].

use zapseller_core::context::{GenerationResponse, ResponsePart};
use zapseller_core::message::{ChatReply, OrderDetails};
use zapseller_core::product::SalesStrategy;
use zapseller_providers::tools::{string_arg, CONFIRM_ORDER};

/// Sent in place of the model text once an order is captured.
pub const ORDER_CONFIRMED_TEXT: &str =
    "Perfeito! Já registrei suas informações aqui no sistema. Posso te ajudar com algo mais?";

/// Sent when the model returned nothing usable.
pub const EMPTY_REPLY_FALLBACK: &str =
    "Oi! Me conta seu nome primeiro para eu saber com quem estou conversando? 😊";

pub fn normalize(response: &GenerationResponse, strategy: SalesStrategy) -> ChatReply {
    let mut text = String::new();
    let mut audio_data = None;
    let mut order_confirmed = None;

    for part in &response.parts {
        match part {
            ResponsePart::Text(t) => text.push_str(t),
            ResponsePart::InlineData { data, .. } if !data.is_empty() => {
                audio_data = Some(data.clone());
            }
            ResponsePart::InlineData { .. } => {}
            ResponsePart::FunctionCall { name, args } if name == CONFIRM_ORDER => {
                order_confirmed = Some(OrderDetails {
                    customer_name: string_arg(args, "customerName"),
                    details: string_arg(args, "details"),
                    strategy,
                });
            }
            ResponsePart::FunctionCall { name, .. } => {
                tracing::warn!("ignoring unknown function call: {name}");
            }
        }
    }

    if order_confirmed.is_some() {
        text = ORDER_CONFIRMED_TEXT.to_string();
    } else if text.trim().is_empty() && audio_data.is_none() {
        text = EMPTY_REPLY_FALLBACK.to_string();
    }

    ChatReply {
        text,
        audio_data,
        order_confirmed,
    }
}
