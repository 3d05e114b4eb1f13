//! Subscription plans. Every limit check reads from the table below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ModelConfig;

/// Past this many history messages the free tier stops calling the model and
/// answers with a static reply.
pub const FREE_AI_HISTORY_LIMIT: usize = 5;

/// Thinking budget granted to the pro tier.
pub const PRO_THINKING_BUDGET: u32 = 8000;

/// Subscription level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Starter,
    Pro,
}

/// Limits and feature flags of one plan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub tier: PlanTier,
    pub name: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    pub max_products: usize,
    pub max_accounts: usize,
    /// `None` = unlimited.
    pub max_messages: Option<u32>,
    pub has_ai: bool,
    pub has_audio_ai: bool,
    pub has_custom_prompt: bool,
    pub has_lead_status: bool,
    pub has_reports: bool,
    pub has_vip_support: bool,
    pub has_auto_qualification: bool,
    pub has_cod_checkout: bool,
    /// External checkout page for paid plans.
    pub checkout_url: Option<&'static str>,
}

static FREE: PlanLimits = PlanLimits {
    tier: PlanTier::Free,
    name: "Free",
    price: "R$ 0",
    description: "Ideal para validar fluxos simples",
    max_products: 1,
    max_accounts: 1,
    max_messages: Some(50),
    has_ai: false,
    has_audio_ai: false,
    has_custom_prompt: false,
    has_lead_status: false,
    has_reports: false,
    has_vip_support: false,
    has_auto_qualification: false,
    has_cod_checkout: false,
    checkout_url: None,
};

static STARTER: PlanLimits = PlanLimits {
    tier: PlanTier::Starter,
    name: "Starter",
    price: "R$ 19,90/mês",
    description: "IA Texto para fechamento CoD",
    max_products: 2,
    max_accounts: 1,
    max_messages: Some(1000),
    has_ai: true,
    has_audio_ai: false,
    has_custom_prompt: true,
    has_lead_status: true,
    has_reports: false,
    has_vip_support: false,
    has_auto_qualification: false,
    has_cod_checkout: true,
    checkout_url: Some("https://pay.kiwify.com.br/Q0UNNyQ"),
};

static PRO: PlanLimits = PlanLimits {
    tier: PlanTier::Pro,
    name: "Pro",
    price: "R$ 39,90/mês",
    description: "O futuro do WhatsApp CoD",
    max_products: 10,
    max_accounts: 10,
    max_messages: None,
    has_ai: true,
    has_audio_ai: true,
    has_custom_prompt: true,
    has_lead_status: true,
    has_reports: true,
    has_vip_support: true,
    has_auto_qualification: true,
    has_cod_checkout: true,
    checkout_url: Some("https://pay.kiwify.com.br/6d9bLtJ"),
};

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Starter, PlanTier::Pro];

    pub fn limits(self) -> &'static PlanLimits {
        match self {
            Self::Free => &FREE,
            Self::Starter => &STARTER,
            Self::Pro => &PRO,
        }
    }

    /// Pick the model for a request. Audio input always goes to the
    /// native-audio model; callers gate audio on `has_audio_ai` first.
    pub fn model_for<'a>(self, has_audio: bool, models: &'a ModelConfig) -> &'a str {
        if has_audio {
            return &models.audio;
        }
        match self {
            Self::Pro => &models.pro,
            Self::Free | Self::Starter => &models.flash,
        }
    }

    pub fn thinking_budget(self) -> Option<u32> {
        match self {
            Self::Pro => Some(PRO_THINKING_BUDGET),
            Self::Free | Self::Starter => None,
        }
    }

    /// Whether the model is skipped in favour of a canned reply.
    pub fn uses_static_reply(self, history_len: usize) -> bool {
        !self.limits().has_ai && history_len > FREE_AI_HISTORY_LIMIT
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            other => Err(format!("unknown plan '{other}'")),
        }
    }
}

impl PlanLimits {
    /// Whether another message may be sent after `sent` messages.
    pub fn allows_message(&self, sent: u32) -> bool {
        match self.max_messages {
            Some(max) => sent < max,
            None => true,
        }
    }
}
