//! # VendHub API
//!
//! Feature-area plugin implementations for the VendHub platform service.

pub mod plugins;

pub use plugins::audit::AuditPlugin;
pub use plugins::billing::BillingPlugin;
pub use plugins::invoices::{InvoicesConfig, InvoicesPlugin};
pub use plugins::landing::LandingPlugin;
pub use plugins::teams::{TeamsConfig, TeamsPlugin};
