//! Resource catalog
//!
//! The provider exposes a fixed set of resource and data-source types. Each
//! type name maps to a constructor describing which API family and
//! collection path it uses.
//!
//! # Architecture
//!
//! - [`registry`] - Static constructor tables and lookup functions
//! - [`fetcher`] - Reads and lists objects of a registered type
//!
//! # Example
//!
//! ```ignore
//! use opc_provider::resource::{get_resource, list_resources};
//! use opc_provider::opc::client::OpcClient;
//!
//! async fn list_instances(client: &OpcClient) -> anyhow::Result<Vec<serde_json::Value>> {
//!     assert!(get_resource("opc_compute_instance").is_some());
//!     list_resources(client, "opc_compute_instance", None).await
//! }
//! ```

mod fetcher;
mod registry;

pub use fetcher::{list_resources, lookup, read_resource, short_name};
pub use registry::*;
