use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use tera::{Context, Tera};

use formsite_core::domain::lead::LeadSubmission;

const ADMIN_NOTIFICATION: &str = include_str!("../templates/admin_notification.html");
const ACKNOWLEDGMENT: &str = include_str!("../templates/acknowledgment.html");

/// A rendered message: subject line plus HTML body.
#[derive(Clone, Debug)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// The two embedded transactional templates. Registered once at startup;
/// submission values are HTML-escaped on render.
pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("admin_notification.html", ADMIN_NOTIFICATION)
            .context("admin notification template failed to register")?;
        tera.add_raw_template("acknowledgment.html", ACKNOWLEDGMENT)
            .context("acknowledgment template failed to register")?;
        Ok(Self { tera })
    }

    /// Internal notification for the studio inbox, stamped with the
    /// submission time.
    pub fn admin_notification(
        &self,
        lead: &LeadSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<RenderedEmail> {
        let mut context = Context::new();
        context.insert("lead", lead);
        context.insert("submitted_at", &submitted_at.format("%Y-%m-%d %H:%M UTC").to_string());

        let html = self
            .tera
            .render("admin_notification.html", &context)
            .context("admin notification template failed to render")?;

        Ok(RenderedEmail {
            subject: format!("New Lead: {} ({})", lead.name, lead.business_name),
            html,
        })
    }

    /// Acknowledgment for the submitter, with the fixed next-steps
    /// sequence.
    pub fn acknowledgment(&self, lead: &LeadSubmission) -> Result<RenderedEmail> {
        let mut context = Context::new();
        context.insert("lead", lead);

        let html = self
            .tera
            .render("acknowledgment.html", &context)
            .context("acknowledgment template failed to render")?;

        Ok(RenderedEmail { subject: "Thank you for your inquiry".to_string(), html })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::EmailTemplates;
    use formsite_core::domain::lead::LeadSubmission;

    fn lead() -> LeadSubmission {
        LeadSubmission {
            name: "Jane Doe".to_string(),
            email: "jane@acme.com".to_string(),
            phone: "+1 555 0100".to_string(),
            business_name: "Acme Wellness".to_string(),
            message: "We need a rebrand.".to_string(),
        }
    }

    #[test]
    fn admin_notification_carries_details_and_timestamp() {
        let templates = EmailTemplates::new().expect("templates");
        let submitted_at = Utc.with_ymd_and_hms(2026, 8, 7, 14, 30, 0).single().expect("time");

        let rendered = templates.admin_notification(&lead(), submitted_at).expect("render");

        assert_eq!(rendered.subject, "New Lead: Jane Doe (Acme Wellness)");
        assert!(rendered.html.contains("Jane Doe"));
        assert!(rendered.html.contains("mailto:jane@acme.com"));
        assert!(rendered.html.contains("+1 555 0100"));
        assert!(rendered.html.contains("2026-08-07 14:30 UTC"));
        assert!(rendered.html.contains("We need a rebrand."));
    }

    #[test]
    fn acknowledgment_carries_next_steps() {
        let templates = EmailTemplates::new().expect("templates");

        let rendered = templates.acknowledgment(&lead()).expect("render");

        assert_eq!(rendered.subject, "Thank you for your inquiry");
        assert!(rendered.html.contains("Hi Jane Doe,"));
        assert!(rendered.html.contains("Acme Wellness"));
        assert!(rendered.html.contains("What happens next?"));
        assert!(rendered.html.contains("initial consultation"));
    }

    #[test]
    fn submission_values_are_html_escaped() {
        let templates = EmailTemplates::new().expect("templates");
        let mut lead = lead();
        lead.message = "<script>alert('x')</script>".to_string();

        let rendered = templates
            .admin_notification(&lead, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap())
            .expect("render");

        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.contains("&lt;script&gt;"));
    }
}
