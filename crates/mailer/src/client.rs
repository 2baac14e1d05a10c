use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use formsite_core::config::MailerConfig;
use formsite_core::errors::PipelineError;

/// One transactional message ready to hand to the email service.
#[derive(Clone, Debug, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// REST adapter for the transactional email service. One POST per message,
/// single attempt; the two sends of a lead submission are independent
/// calls.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct SendReceipt {
    #[serde(default)]
    id: String,
}

impl Mailer {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self { http, base_url: base_url.into(), api_key }
    }

    pub fn from_config(http: reqwest::Client, config: &MailerConfig) -> Result<Self, PipelineError> {
        let api_key = config.require_api_key()?.clone();
        Ok(Self::new(http, config.base_url.clone(), api_key))
    }

    /// Sends exactly one email and returns the provider's message id.
    pub async fn send(&self, email: &OutboundEmail) -> Result<String> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(email)
            .send()
            .await
            .context("email send request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("email service returned {status}: {body}"));
        }

        let receipt: SendReceipt =
            response.json().await.context("failed to decode send response")?;
        debug!(message_id = %receipt.id, to = %email.to, "email accepted by provider");
        Ok(receipt.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{Mailer, OutboundEmail};

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "FORM Creative <onboarding@resend.dev>".to_string(),
            to: "owner@studio.test".to_string(),
            subject: "New Lead: Jane Doe (Acme Wellness)".to_string(),
            html: "<p>hello</p>".to_string(),
        }
    }

    fn test_mailer(base_url: &str) -> Mailer {
        Mailer::new(reqwest::Client::new(), base_url, "email-key".to_string().into())
    }

    #[tokio::test]
    async fn posts_one_message_with_bearer_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer email-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let id = test_mailer(&server.uri()).send(&email()).await.expect("send");
        assert_eq!(id, "msg-1");

        let requests = server.received_requests().await.expect("recording enabled");
        let body: Value = requests[0].body_json().expect("json body");
        assert_eq!(body["to"], json!("owner@studio.test"));
        assert_eq!(body["subject"], json!("New Lead: Jane Doe (Acme Wellness)"));
        assert!(body["html"].as_str().expect("html").contains("<p>"));
    }

    #[tokio::test]
    async fn rejected_sends_surface_as_failures() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "invalid from address"
            })))
            .mount(&server)
            .await;

        let error = test_mailer(&server.uri()).send(&email()).await.expect_err("should fail");
        assert!(error.to_string().contains("email service returned"));
    }
}
