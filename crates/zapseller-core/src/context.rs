//! Provider-agnostic generation request and response.
//!
//! The sales layer builds a [`GenerationRequest`]; providers translate it to
//! their wire format and hand back a [`GenerationResponse`] made of typed parts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the model may call instead of answering in free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    /// JSON Schema for parameters.
    pub parameters: Value,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    /// "user" or "model".
    pub role: String,
    pub parts: Vec<Part>,
}

/// A piece of a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: String },
}

/// Everything a provider needs for one call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub contents: Vec<Content>,
    pub temperature: f32,
    pub tools: Vec<ToolDef>,
    /// Reasoning token budget; `None` leaves the model default.
    pub thinking_budget: Option<u32>,
}

/// A piece of the model's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    Text(String),
    InlineData { mime_type: String, data: String },
    FunctionCall { name: String, args: Value },
}

/// Raw provider answer before normalization.
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    pub parts: Vec<ResponsePart>,
    pub tokens_used: Option<u64>,
    pub model: Option<String>,
}
