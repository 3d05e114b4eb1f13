//! Google Gemini API provider.
//!
//! Calls the Gemini `generateContent` endpoint. Auth via URL query param.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use zapseller_core::{
    config::GeminiConfig,
    context::{Content, GenerationRequest, GenerationResponse, Part, ResponsePart, ToolDef},
    error::ZapError,
    traits::Provider,
};

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiProvider {
    /// Create from config values.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, ZapError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ZapError::Config(format!("gemini: failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    /// Set on reasoning summaries emitted by thinking models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    total_token_count: u64,
}

fn wire_part(part: &Part) -> GeminiPart {
    match part {
        Part::Text(text) => GeminiPart {
            text: Some(text.clone()),
            ..Default::default()
        },
        Part::InlineData { mime_type, data } => GeminiPart {
            inline_data: Some(InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            }),
            ..Default::default()
        },
    }
}

fn wire_content(content: &Content) -> GeminiContent {
    GeminiContent {
        role: Some(content.role.clone()),
        parts: content.parts.iter().map(wire_part).collect(),
    }
}

fn wire_tools(tools: &[ToolDef]) -> Vec<GeminiTool> {
    if tools.is_empty() {
        return Vec::new();
    }
    vec![GeminiTool {
        function_declarations: tools
            .iter()
            .map(|t| FunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect(),
    }]
}

/// Translate a provider-agnostic request into the Gemini body.
fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let system_instruction = if request.system_instruction.trim().is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(request.system_instruction.clone()),
                ..Default::default()
            }],
        })
    };

    GeminiRequest {
        contents: request.contents.iter().map(wire_content).collect(),
        system_instruction,
        tools: wire_tools(&request.tools),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            thinking_config: request.thinking_budget.map(|thinking_budget| ThinkingConfig {
                thinking_budget,
            }),
        },
    }
}

/// Flatten the first candidate into typed parts. Thought summaries are dropped.
fn parse_response(parsed: GeminiResponse) -> GenerationResponse {
    let parts = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(text) = part.text {
            out.push(ResponsePart::Text(text));
        }
        if let Some(inline) = part.inline_data {
            out.push(ResponsePart::InlineData {
                mime_type: inline.mime_type,
                data: inline.data,
            });
        }
        if let Some(call) = part.function_call {
            out.push(ResponsePart::FunctionCall {
                name: call.name,
                args: call.args,
            });
        }
    }

    GenerationResponse {
        parts: out,
        tokens_used: parsed.usage_metadata.map(|u| u.total_token_count),
        model: parsed.model_version,
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ZapError> {
        let start = Instant::now();
        let body = build_request(request);
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        debug!(
            "gemini: POST models/{}:generateContent ({} turns, thinking={:?})",
            request.model,
            request.contents.len(),
            request.thinking_budget
        );

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ZapError::Provider(format!("gemini request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ZapError::Provider(format!(
                "gemini returned {status}: {text}"
            )));
        }

        let parsed: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| ZapError::Provider(format!("gemini: failed to parse response: {e}")))?;

        let mut response = parse_response(parsed);
        if response.model.is_none() {
            response.model = Some(request.model.clone());
        }
        debug!(
            "gemini: {} parts in {}ms (tokens={:?})",
            response.parts.len(),
            start.elapsed().as_millis(),
            response.tokens_used
        );
        Ok(response)
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("gemini: no API key configured");
            return false;
        }
        let url = format!("{}/models", self.base_url);
        match self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("gemini not available: {e}");
                false
            }
        }
    }
}
