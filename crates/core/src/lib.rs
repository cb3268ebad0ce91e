//! Pure transformation core for the KoboPush upload workflow.
//!
//! Everything in this crate is synchronous, in-memory logic (no network,
//! no filesystem, no async):
//!
//! - [`schema`] — form schema model and parsing of platform asset JSON
//! - [`flatten`] — hierarchical schema to flat column sequence
//! - [`template`] — blank / pre-filled template sheets
//! - [`upload`] — untyped spreadsheet rows as uploaded by the user
//! - [`ident`] — submission identifier normalization and row matching
//! - [`payload`] — OpenRosa XML submission documents
//! - [`report`] — ordered per-row outcome aggregation

pub mod error;
pub mod flatten;
pub mod ident;
pub mod payload;
pub mod report;
pub mod schema;
pub mod template;
pub mod upload;
