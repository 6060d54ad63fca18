//! API clients for external services
//!
//! - Catalog: iptv-org channels and streams directories

pub mod catalog;

pub use catalog::{CatalogClient, CatalogError};
