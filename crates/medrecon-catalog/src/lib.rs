//! Catalog and persistence payloads for the reconciliation engine.
//!
//! This crate turns catalog-API and treatment-API JSON into
//! `medrecon_core` types, and replays scripted editing sessions.

pub mod payload;
pub mod replay;

pub use payload::*;
pub use replay::*;
