//! Core logic for moving members between messaging-platform groups.
//!
//! The platform itself (sessions, RPC) lives behind the `PlatformClient` port;
//! this crate owns pacing, fault classification, the error budget, the
//! invitation engine and group resolution.

pub mod audit;
pub mod budget;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod groups;
pub mod logging;
pub mod migration;
pub mod pacing;
pub mod ports;
pub mod selector;
pub mod summarize;

#[cfg(test)]
mod testing;

pub use errors::{Error, Fault, Result};
