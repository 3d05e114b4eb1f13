use crate::{
    context::{GenerationRequest, GenerationResponse},
    error::ZapError,
};
use async_trait::async_trait;

/// LLM provider trait.
///
/// The sales layer talks to the hosted model only through this trait, so
/// tests can swap in a scripted provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider requires an API key to function.
    fn requires_api_key(&self) -> bool;

    /// Run one generation call.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ZapError>;

    /// Check if the provider is reachable and the key is accepted.
    async fn is_available(&self) -> bool;
}
