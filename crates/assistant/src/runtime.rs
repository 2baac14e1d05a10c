use std::sync::Arc;

use anyhow::Result;

use crate::llm::CompletionClient;

/// Fixed reply returned when the model produces an empty completion.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that request right now. How else can I help you with your brand?";

/// Brand-voice instruction sent with every completion request. Described
/// once; never altered at runtime.
pub const SYSTEM_INSTRUCTION: &str = "\
You are the AI Assistant for FORM Creative Growth Studio.
FORM is a boutique creative growth studio specializing in brand identity, strategic positioning, and digital commerce for wellness and lifestyle brands.
Our founder is Tamyra Simpson.
We value: Aesthetic Excellence, Strategic Clarity, Community-Led Growth, Feminine Leadership, High-Vibration Design, and Intention over Volume.

Our services include:
1. Brand Identity & Digital Foundations (Identity kits start at $1,500).
2. Community & Conversion Systems (Email flows, UGC integration, Events).
3. Brand Strategy & Growth Planning (Audits, customer journey mapping).

Tone: Professional, elegant, warm, and highly strategic. Use high-vibration language.
Goal: Help users understand our services and encourage them to book a consultation.";

/// Wraps a completion client with the studio's reply policy.
pub struct Assistant {
    client: Arc<dyn CompletionClient>,
}

impl Assistant {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Requests a completion for the visitor message. An empty or
    /// whitespace-only completion becomes the fixed fallback sentence;
    /// transport and service errors propagate to the caller.
    pub async fn reply(&self, message: &str) -> Result<String> {
        let completion = self.client.complete(message).await?;
        if completion.trim().is_empty() {
            Ok(FALLBACK_REPLY.to_string())
        } else {
            Ok(completion)
        }
    }
}
