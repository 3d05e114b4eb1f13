//! System instruction and conversation assembly.

use tracing::warn;
use zapseller_core::context::{Content, Part};
use zapseller_core::message::{AudioData, ChatMessage, ChatRole};
use zapseller_core::plan::PlanTier;
use zapseller_core::product::Product;
use zapseller_core::sanitize::sanitize;

/// Custom instructions every new workspace starts with.
pub const DEFAULT_CUSTOM_PROMPT: &str = "Você é um vendedor que ama ajudar pessoas. \
Use muita empatia. Primeiro valide a dor do cliente, mostre que você entende o que ele está \
passando. Só depois apresente o produto como a solução ideal. Reforce sempre o Pagamento na \
Entrega para tirar o peso da decisão.";

/// Appended next to a customer voice note.
pub const AUDIO_EMPATHY_HINT: &str = "O cliente enviou um áudio. Responda demonstrando muita \
empatia, valide a dor mencionada no áudio e adapte para o gênero dele(a).";

const VIP_INSTRUCTION: &str = "Você é o Gerente VIP do ZapSeller AI. Ajude o usuário a \
configurar sua operação de vendas no WhatsApp.";

/// Placeholder for a turn the customer sent without text.
const EMPTY_TURN_TEXT: &str = "Olá";

/// Build the system instruction for one call.
pub fn build_system_instruction(product: &Product, custom_prompt: &str, vip: bool) -> String {
    if vip {
        return VIP_INSTRUCTION.to_string();
    }

    let strategy = product.sales_strategy.instructions(product);
    format!(
        "Aja como um vendedor experiente de WhatsApp para o produto: {name}.\n\
         PREÇO: R$ {price}\n\
         BENEFÍCIOS: {benefits}\n\
         ESTRATÉGIA: {strategy}\n\
         REGRAS:\n\
         1. Seja persuasivo e use emojis.\n\
         2. Use frases curtas.\n\
         3. Nunca diga que é uma IA.\n\
         4. Use gatilhos de escassez e urgência.\n\
         5. {custom}",
        name = product.name,
        price = product.price,
        benefits = product.benefits,
        custom = custom_prompt.trim(),
    )
}

/// The custom prompt that actually reaches the model on `plan`.
pub fn effective_custom_prompt(plan: PlanTier, custom_prompt: &str) -> &str {
    if plan.limits().has_custom_prompt {
        custom_prompt
    } else {
        DEFAULT_CUSTOM_PROMPT
    }
}

/// Canned answer for the free tier once the AI allowance is used.
pub fn static_free_reply(product: &Product) -> String {
    format!(
        "Olá! Sou um atendente automatizado. Para um atendimento humano via IA inteligente, \
         faça upgrade do seu plano. O valor do produto é R$ {}",
        product.price
    )
}

/// Convert the chat history into provider turns.
///
/// Customer text is sanitized; a voice note is attached to the last turn
/// only when that turn belongs to the customer.
pub fn build_contents(history: &[ChatMessage], audio: Option<&AudioData>) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| {
            let (role, text) = match msg.role {
                ChatRole::Model => ("model", msg.text.clone()),
                ChatRole::User => {
                    let clean = sanitize(&msg.text);
                    if clean.was_modified {
                        warn!("sanitized customer message: {}", clean.warnings.join(", "));
                    }
                    ("user", clean.text)
                }
            };
            let text = if text.trim().is_empty() {
                EMPTY_TURN_TEXT.to_string()
            } else {
                text
            };
            Content {
                role: role.to_string(),
                parts: vec![Part::Text(text)],
            }
        })
        .collect();

    if let Some(audio) = audio {
        match contents.last_mut() {
            Some(last) if last.role == "user" => {
                last.parts.push(Part::InlineData {
                    mime_type: audio.mime_type.clone(),
                    data: audio.data.clone(),
                });
                last.parts.push(Part::Text(AUDIO_EMPATHY_HINT.to_string()));
            }
            _ => warn!("voice note dropped: last turn is not from the customer"),
        }
    }

    contents
}
