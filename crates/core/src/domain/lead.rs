use serde::Serialize;

use crate::errors::PipelineError;
use crate::payload::{self, Payload};

/// Status every freshly inserted lead record carries.
pub const LEAD_STATUS_NEW: &str = "new";
/// Source marker distinguishing website submissions in the leads table.
pub const LEAD_SOURCE_WEBSITE: &str = "website";

/// A validated booking-form submission.
///
/// Immutable once parsed; discarded when the pipeline completes. The only
/// persistent copy is the record the storage service keeps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub business_name: String,
    pub message: String,
}

impl LeadSubmission {
    /// Normalizes and validates an inbound form body. All five fields are
    /// required and trimmed independently; any absent, non-string, or
    /// blank field rejects the whole submission.
    pub fn parse(body: Payload<'_>) -> Result<Self, PipelineError> {
        let map = payload::into_object(body, "Invalid form payload")?;

        let name = payload::required_trimmed(&map, "name");
        let email = payload::required_trimmed(&map, "email");
        let phone = payload::required_trimmed(&map, "phone");
        let business_name = payload::required_trimmed(&map, "businessName");
        let message = payload::required_trimmed(&map, "message");

        match (name, email, phone, business_name, message) {
            (Some(name), Some(email), Some(phone), Some(business_name), Some(message)) => {
                Ok(Self { name, email, phone, business_name, message })
            }
            _ => Err(PipelineError::MissingField("Missing required fields".to_string())),
        }
    }

    /// Wire form of this submission as the storage service persists it.
    pub fn record(&self) -> LeadRecord<'_> {
        LeadRecord {
            name: &self.name,
            email: &self.email,
            phone: &self.phone,
            business_name: &self.business_name,
            message: &self.message,
            status: LEAD_STATUS_NEW,
            source: LEAD_SOURCE_WEBSITE,
        }
    }
}

/// One row of the hosted `leads` table, column names included.
#[derive(Clone, Debug, Serialize)]
pub struct LeadRecord<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub business_name: &'a str,
    pub message: &'a str,
    pub status: &'static str,
    pub source: &'static str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::LeadSubmission;
    use crate::errors::PipelineError;
    use crate::payload::Payload;

    fn valid_body() -> serde_json::Value {
        json!({
            "name": "  Jane Doe ",
            "email": "jane@acme.com",
            "phone": "+1 555 0100",
            "businessName": "Acme Wellness",
            "message": "We need a rebrand."
        })
    }

    #[test]
    fn parses_and_trims_all_fields() {
        let lead = LeadSubmission::parse(Payload::Structured(valid_body())).expect("valid");
        assert_eq!(lead.name, "Jane Doe");
        assert_eq!(lead.business_name, "Acme Wellness");
    }

    #[test]
    fn any_missing_field_rejects_the_submission() {
        for field in ["name", "email", "phone", "businessName", "message"] {
            let mut body = valid_body();
            body.as_object_mut().expect("object").remove(field);

            let error = LeadSubmission::parse(Payload::Structured(body)).expect_err("fail");
            assert_eq!(
                error,
                PipelineError::MissingField("Missing required fields".to_string()),
                "removing `{field}` should fail validation"
            );
        }
    }

    #[test]
    fn whitespace_only_field_rejects_the_submission() {
        let mut body = valid_body();
        body["phone"] = json!("   ");

        let error = LeadSubmission::parse(Payload::Structured(body)).expect_err("fail");
        assert_eq!(error, PipelineError::MissingField("Missing required fields".to_string()));
    }

    #[test]
    fn null_field_stays_absent() {
        let mut body = valid_body();
        body["businessName"] = json!(null);

        let error = LeadSubmission::parse(Payload::Structured(body)).expect_err("fail");
        assert_eq!(error, PipelineError::MissingField("Missing required fields".to_string()));
    }

    #[test]
    fn record_maps_columns_and_fixed_fields() {
        let lead = LeadSubmission::parse(Payload::Structured(valid_body())).expect("valid");
        let row = serde_json::to_value(lead.record()).expect("serialize");

        assert_eq!(row["business_name"], json!("Acme Wellness"));
        assert_eq!(row["status"], json!("new"));
        assert_eq!(row["source"], json!("website"));
        assert!(row.get("businessName").is_none());
    }
}
