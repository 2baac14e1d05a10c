//! Lead persistence - the one write path into the hosted Postgres service.
//!
//! The storage service fronts Postgres with a REST layer, so an insert is
//! a single POST carrying the row; this crate never speaks SQL and never
//! reads back. `LeadStore` is the whole surface.

pub mod store;

pub use store::LeadStore;
