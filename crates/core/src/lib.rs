//! Core types for the FORM Creative site backend.
//!
//! This crate holds everything the request pipelines share and nothing
//! that talks to the network:
//! - **Configuration** (`config`) - layered load from `formsite.toml` and
//!   the environment, with the hosted-service variable names preserved
//!   verbatim as the deployment contract
//! - **Errors** (`errors`) - the pipeline failure taxonomy, each kind
//!   carrying its HTTP status class and a client-safe detail string
//! - **Payloads** (`payload`) - the inbound-body union and the normalizer
//!   that resolves it to a JSON object exactly once, at the edge
//! - **Domain** (`domain`) - `ChatRequest` and `LeadSubmission` with their
//!   trim-and-validate constructors

pub mod config;
pub mod domain;
pub mod errors;
pub mod payload;

pub use config::{AppConfig, ConfigError, LoadOptions};
pub use domain::chat::ChatRequest;
pub use domain::lead::{LeadRecord, LeadSubmission};
pub use errors::PipelineError;
pub use payload::Payload;
