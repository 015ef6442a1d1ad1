//! LLM provider integrations for chat-relay
//!
//! This crate provides the provider abstraction used by the chat gateway and
//! the Google Gemini `generateContent` client.

pub mod base;
pub mod gemini;

pub use base::{ChatProvider, Generation, GenerationRequest, ProviderError, ProviderResult, Usage};
pub use gemini::GeminiClient;
