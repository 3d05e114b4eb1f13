//! # zapseller-memory
//!
//! SQLite-backed audit log of salesperson exchanges and the conversion
//! reports derived from it.

pub mod audit;
pub mod store;

pub use audit::AuditLogger;
pub use store::{ConversionReport, OrderRow, Store};
