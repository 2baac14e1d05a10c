//! AI assistant integration - brand-voice replies for site visitors.
//!
//! This crate is the chat pipeline's only external dependency:
//! - **Trait** (`llm`) - `CompletionClient`, the seam the runtime and the
//!   tests plug into
//! - **Gemini** (`gemini`) - the REST client for the hosted generation API
//! - **Runtime** (`runtime`) - `Assistant`, which owns the studio persona
//!   and substitutes the fixed fallback reply for empty completions
//!
//! The model is strictly a copywriter here. It answers service questions in
//! the studio's voice; it never sees lead data and never makes decisions.

pub mod gemini;
pub mod llm;
pub mod runtime;

pub use gemini::GeminiClient;
pub use llm::CompletionClient;
pub use runtime::{Assistant, FALLBACK_REPLY};
