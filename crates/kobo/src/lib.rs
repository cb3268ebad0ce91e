//! REST client for the KoboToolbox-style survey platform.
//!
//! Wraps the two platform surfaces the workflow needs: the project/form
//! API (`kf` host: asset listing, asset detail, submission data, exports)
//! and the legacy data-collection API (`kc` host: deployed form listing,
//! XML submission intake), using [`reqwest`].

pub mod assets;
pub mod client;
pub mod config;
pub mod data;
pub mod submit;

pub use assets::{choose_form_id, AssetSummary, DeployedForm};
pub use client::{KoboApiError, KoboClient};
pub use config::{KoboSession, ServerChoice};
pub use submit::SubmitOutcome;
