//! OPC API interaction module
//!
//! Authentication, HTTP transport and the client the provider hands to
//! resource operations.
//!
//! # Module Structure
//!
//! - [`auth`] - Compute session cookies and storage tokens
//! - [`client`] - Compute and storage clients built from a resolved config
//! - [`http`] - HTTP utilities with retry and error formatting
//!
//! # Example
//!
//! ```ignore
//! use opc_provider::config::{Config, ConfigInput};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = Config::from_input(&ConfigInput::default())?;
//!     let client = config.client().await?;
//!     let url = client.compute().container_url("/instance");
//!     let instances = client.compute().get(&url).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
