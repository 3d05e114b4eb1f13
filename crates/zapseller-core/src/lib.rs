//! # zapseller-core
//!
//! Core types, plan table, configuration, and error handling for ZapSeller.

pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod plan;
pub mod product;
pub mod sanitize;
pub mod traits;

pub use config::shellexpand;
