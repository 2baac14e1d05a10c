//! Transactional email - the lead pipeline's notification channel.
//!
//! Two messages go out per accepted lead, in order: an internal
//! notification to the studio inbox, then an acknowledgment to the
//! submitter. `Mailer` (`client`) performs the sends; `EmailTemplates`
//! (`templates`) renders the embedded HTML bodies.

pub mod client;
pub mod templates;

pub use client::{Mailer, OutboundEmail};
pub use templates::{EmailTemplates, RenderedEmail};
