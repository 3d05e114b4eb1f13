//! # zapseller-providers
//!
//! LLM provider implementations for ZapSeller.

pub mod gemini;
pub mod tools;

pub use gemini::GeminiProvider;
