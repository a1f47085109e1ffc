#![doc = "adm-publish-core: core logic library for adm-publish."]

//! This crate contains the publish pipeline for administrative codes and
//! boundary GeoJSON: locating source files, transforming the code table,
//! writing versioned objects and announcing the published version.
//! The concrete object-store client lives in the CLI crate.
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, transform and config code.

pub mod announce;
pub mod config;
pub mod contract;
pub mod error;
pub mod locate;
pub mod pipeline;
pub mod publish;
pub mod transform;

pub use error::{PublishError, Result};
