//! Wire and document types
//!
//! - `config`: the user-authored ad-hoc request document
//! - `request`: the assembled, submittable execution request
//! - `status`: execution status snapshots returned by the service

pub mod config;
pub mod request;
pub mod status;
