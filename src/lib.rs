//! AlertBot - operational alert store and notification fan-out
//!
//! This library holds the alert history, assigns alert identity, and fans
//! every new alert out to a shared channel and to each open dashboard.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod formatting;
pub mod ingress;
pub mod internal_metrics;
pub mod notification;
pub mod service;
pub mod store;

// Re-export core types for convenience
pub use crate::core::*;
pub use service::AlertService;
pub use store::AlertStore;
