//! Resource Fetcher
//!
//! Reads objects of a registered type through the compute or storage client.

use super::registry::{get_data_source, get_resource, CapabilityDef, Service};
use crate::opc::client::OpcClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Look a type name up among resources, then data sources
pub fn lookup(key: &str) -> Result<&'static CapabilityDef> {
    get_resource(key)
        .or_else(|| get_data_source(key))
        .ok_or_else(|| anyhow::anyhow!("Unknown resource: {}", key))
}

/// Percent-encode each `/`-separated segment of a storage path
fn encode_storage_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read a single object of type `key`
///
/// Compute names may be short (`web-1`) or fully qualified
/// (`/Compute-domain/user/web-1`). Storage names are a container, or
/// `container/object` for object metadata.
pub async fn read_resource(client: &OpcClient, key: &str, name: &str) -> Result<Value> {
    let def = lookup(key)?;
    tracing::debug!("read_resource: type={}, name={}", key, name);

    match def.service {
        Service::Compute => {
            let compute = client.compute();
            let url = compute.object_url(def.path, name);
            compute
                .get(&url)
                .await
                .with_context(|| format!("Failed to read {} {}", key, name))
        }
        Service::Storage => {
            let storage = client.storage()?;
            let path = encode_storage_path(name.trim_matches('/'));

            let result = if path.contains('/') {
                storage.head(&path).await
            } else {
                storage.get(&path).await
            };

            result.with_context(|| format!("Failed to read {} {}", key, name))
        }
    }
}

/// List every object of type `key` owned by the configured user
///
/// `opc_storage_object` needs the container to list in `parent`; other
/// types ignore it.
pub async fn list_resources(
    client: &OpcClient,
    key: &str,
    parent: Option<&str>,
) -> Result<Vec<Value>> {
    let def = lookup(key)?;
    tracing::debug!("list_resources: type={}", key);

    let response = match def.service {
        Service::Compute => {
            let compute = client.compute();
            let url = compute.container_url(def.path);
            compute.get(&url).await
        }
        Service::Storage => {
            let storage = client.storage()?;
            if def.name == "opc_storage_object" {
                let container = parent
                    .filter(|p| !p.is_empty())
                    .with_context(|| format!("Listing {} requires a container", key))?;
                storage.get(&encode_storage_path(container)).await
            } else {
                storage.get("").await
            }
        }
    }
    .with_context(|| format!("Failed to list {}", key))?;

    Ok(extract_items(response))
}

/// Compute lists wrap items in `result`; storage lists are bare arrays
fn extract_items(response: Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    }
}

/// Short display name of an object: last segment of a qualified name
pub fn short_name(item: &Value) -> String {
    let name = item
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("-");
    name.rsplit('/').next().unwrap_or(name).to_string()
}
