//! Domain models for the medication reconciliation engine.

mod catalog;
mod identity;
mod medication;
mod protocol;
mod treatment;

pub use catalog::*;
pub use identity::*;
pub use medication::*;
pub use protocol::*;
pub use treatment::*;
