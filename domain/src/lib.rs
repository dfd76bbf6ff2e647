//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. Entity models reach the web layer through here while
//! the persistence details remain in the `entity_api` crate.
pub use entity_api::{case_recordings, recording_status, site_configs, Id};

pub mod case_recording;
pub mod error;
pub mod identity;
pub mod insight;
pub mod object_uri;
pub mod site_config;

pub mod gateway;
