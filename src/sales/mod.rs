//! The virtual salesperson: admits a chat message against the operator's
//! plan, assembles the call, dispatches it and normalizes the answer.

pub mod lead;
pub mod normalize;
pub mod prompt;


use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use zapseller_core::config::ModelConfig;
use zapseller_core::context::GenerationRequest;
use zapseller_core::error::ZapError;
use zapseller_core::message::{AudioData, ChatMessage, ChatReply, ChatRole};
use zapseller_core::plan::PlanTier;
use zapseller_core::traits::Provider;
use zapseller_memory::audit::{AuditEntry, AuditLogger, AuditStatus, OrderEntry};
use zapseller_providers::tools::confirm_order_tool;

use crate::workspace::{ChatSession, Workspace};
use lead::{mentions_delivery, mentions_price, LeadStatus};
use normalize::normalize;
use prompt::{build_contents, build_system_instruction, effective_custom_prompt, static_free_reply};

/// Label stored for a voice note without text.
const VOICE_NOTE_LABEL: &str = "🎤 Mensagem de voz";

/// One chat request from the simulator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    /// Groups exchanges of one simulated customer in reports.
    #[serde(default = "default_conversation_id")]
    pub conversation_id: String,
    /// Full conversation so far, ending with the customer's message.
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub audio_data: Option<AudioData>,
    #[serde(default)]
    pub is_vip_support: bool,
    /// Product to sell; the active product when absent.
    #[serde(default)]
    pub product_id: Option<String>,
}

fn default_conversation_id() -> String {
    "default".to_string()
}

/// Result of [`Salesperson::reply`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutcome {
    #[serde(flatten)]
    pub reply: ChatReply,
    /// Only on plans with lead status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_status: Option<LeadStatus>,
    pub messages_sent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Check plan gates for a turn. Quota is checked first.
pub fn check_gates(plan: PlanTier, messages_sent: u32, turn: &ChatTurn) -> Result<(), ZapError> {
    let limits = plan.limits();
    if !limits.allows_message(messages_sent) {
        return Err(ZapError::QuotaExceeded {
            limit: limits.max_messages.unwrap_or(u32::MAX),
        });
    }
    if turn.audio_data.is_some() && !limits.has_audio_ai {
        return Err(ZapError::FeatureLocked("audio".to_string()));
    }
    if turn.is_vip_support && !limits.has_vip_support {
        return Err(ZapError::FeatureLocked("vip_support".to_string()));
    }
    Ok(())
}

/// Orchestrates one customer exchange.
pub struct Salesperson {
    provider: Option<Arc<dyn Provider>>,
    models: ModelConfig,
    temperature: f32,
    audit: Option<AuditLogger>,
}

impl Salesperson {
    pub fn new(provider: Option<Arc<dyn Provider>>, models: ModelConfig, temperature: f32) -> Self {
        Self {
            provider,
            models,
            temperature,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    /// Answer the last customer message of `turn` on behalf of `operator`.
    pub async fn reply(
        &self,
        workspace: &Workspace,
        operator: &str,
        turn: ChatTurn,
    ) -> Result<ChatOutcome, ZapError> {
        if turn.history.is_empty() {
            return Err(ZapError::Invalid("empty conversation".to_string()));
        }

        let started = Instant::now();
        let mut gated_plan = None;
        let admitted = workspace
            .admit_message(operator, turn.product_id.as_deref(), |plan, sent| {
                gated_plan = Some(plan);
                check_gates(plan, sent, &turn)
            })
            .await;

        let session = match admitted {
            Ok(session) => session,
            Err(e) => {
                if let Some(plan) = gated_plan {
                    warn!("chat denied for {operator}: {e}");
                    self.audit(operator, &turn, plan, Exchange::failed(AuditStatus::Denied, &e))
                        .await;
                }
                return Err(e);
            }
        };

        match self.dispatch(&session, &turn).await {
            Ok((reply, model)) => {
                let lead_status = if session.plan.limits().has_lead_status {
                    let mut convo = turn.history.clone();
                    convo.push(ChatMessage::model(reply.text.clone()));
                    Some(LeadStatus::classify(&convo))
                } else {
                    None
                };

                let elapsed = started.elapsed().as_millis() as i64;
                info!(
                    "chat {operator} [{}] {} in {elapsed}ms",
                    session.plan,
                    model.as_deref().unwrap_or("static")
                );

                self.audit(
                    operator,
                    &turn,
                    session.plan,
                    Exchange {
                        status: AuditStatus::Ok,
                        output: Some(reply.text.clone()),
                        model: model.clone(),
                        processing_ms: Some(elapsed),
                        error: None,
                        order_confirmed: reply.order_confirmed.is_some(),
                    },
                )
                .await;
                self.audit_order(operator, &turn, &session, &reply).await;

                Ok(ChatOutcome {
                    reply,
                    lead_status,
                    messages_sent: session.messages_sent,
                    model,
                })
            }
            Err(e) => {
                error!("chat {operator} failed: {e}");
                let mut exchange = Exchange::failed(AuditStatus::Error, &e);
                exchange.processing_ms = Some(started.elapsed().as_millis() as i64);
                self.audit(operator, &turn, session.plan, exchange).await;
                Err(e)
            }
        }
    }

    /// Produce the reply for an admitted message. Returns the model used,
    /// `None` for the canned free-tier reply.
    async fn dispatch(
        &self,
        session: &ChatSession,
        turn: &ChatTurn,
    ) -> Result<(ChatReply, Option<String>), ZapError> {
        if session.plan.uses_static_reply(turn.history.len()) {
            return Ok((
                ChatReply {
                    text: static_free_reply(&session.product),
                    ..Default::default()
                },
                None,
            ));
        }

        let provider = self.provider.as_ref().ok_or(ZapError::MissingApiKey)?;

        let custom = effective_custom_prompt(session.plan, &session.custom_prompt);
        let request = GenerationRequest {
            model: session
                .plan
                .model_for(turn.audio_data.is_some(), &self.models)
                .to_string(),
            system_instruction: build_system_instruction(
                &session.product,
                custom,
                turn.is_vip_support,
            ),
            contents: build_contents(&turn.history, turn.audio_data.as_ref()),
            temperature: self.temperature,
            tools: vec![confirm_order_tool()],
            thinking_budget: session.plan.thinking_budget(),
        };

        let response = provider.generate(&request).await?;
        let reply = normalize(&response, session.product.sales_strategy);
        Ok((reply, Some(response.model.unwrap_or(request.model))))
    }

    async fn audit(&self, operator: &str, turn: &ChatTurn, plan: PlanTier, exchange: Exchange) {
        let Some(audit) = &self.audit else {
            return;
        };
        let input = customer_text(turn);
        let entry = AuditEntry {
            operator: operator.to_string(),
            conversation_id: turn.conversation_id.clone(),
            plan: plan.to_string(),
            intent_price: mentions_price(&input),
            intent_delivery: exchange.order_confirmed || mentions_delivery(&input),
            input_text: input,
            output_text: exchange.output,
            model: exchange.model,
            processing_ms: exchange.processing_ms,
            status: exchange.status,
            error: exchange.error,
        };
        if let Err(e) = audit.log(&entry).await {
            warn!("audit log failed: {e}");
        }
    }

    async fn audit_order(
        &self,
        operator: &str,
        turn: &ChatTurn,
        session: &ChatSession,
        reply: &ChatReply,
    ) {
        let (Some(audit), Some(order)) = (&self.audit, &reply.order_confirmed) else {
            return;
        };
        let entry = OrderEntry {
            operator: operator.to_string(),
            conversation_id: turn.conversation_id.clone(),
            product_id: session.product.id.clone(),
            customer_name: order.customer_name.clone(),
            details: order.details.clone(),
            strategy: order.strategy.as_str().to_string(),
        };
        if let Err(e) = audit.log_order(&entry).await {
            warn!("order log failed: {e}");
        }
    }
}

struct Exchange {
    status: AuditStatus,
    output: Option<String>,
    model: Option<String>,
    processing_ms: Option<i64>,
    error: Option<String>,
    order_confirmed: bool,
}

impl Exchange {
    fn failed(status: AuditStatus, err: &ZapError) -> Self {
        Self {
            status,
            output: None,
            model: None,
            processing_ms: None,
            error: Some(err.to_string()),
            order_confirmed: false,
        }
    }
}

/// The customer's latest words, as stored in the audit log.
fn customer_text(turn: &ChatTurn) -> String {
    let last = turn
        .history
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::User)
        .map(|m| m.text.trim())
        .unwrap_or_default();
    if last.is_empty() && turn.audio_data.is_some() {
        VOICE_NOTE_LABEL.to_string()
    } else {
        last.to_string()
    }
}
