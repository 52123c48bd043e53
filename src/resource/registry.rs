//! Resource Registry - Static catalog of resource and data-source types
//!
//! Each type name maps to a constructor returning its [`CapabilityDef`]. The
//! tables are materialized into lookup maps on first access and never change
//! afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Whether a capability is a managed resource or a read-only data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Resource,
    DataSource,
}

/// API family a capability talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Compute,
    Storage,
}

/// Definition produced by a capability constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityDef {
    pub name: &'static str,
    pub kind: CapabilityKind,
    pub service: Service,
    /// Collection path under the service endpoint, e.g. `/instance`
    pub path: &'static str,
    pub description: &'static str,
}

/// Constructor registered for a type name
pub type Constructor = fn() -> CapabilityDef;

macro_rules! capability {
    ($fn_name:ident, $name:literal, $kind:ident, $service:ident, $path:literal, $description:literal) => {
        fn $fn_name() -> CapabilityDef {
            CapabilityDef {
                name: $name,
                kind: CapabilityKind::$kind,
                service: Service::$service,
                path: $path,
                description: $description,
            }
        }
    };
}

// Data sources
capability!(data_source_image_list_entry, "opc_compute_image_list_entry", DataSource, Compute, "/imagelist", "Entry of a machine image list");
capability!(data_source_machine_image, "opc_compute_machine_image", DataSource, Compute, "/machineimage", "Machine image");
capability!(data_source_network_interface, "opc_compute_network_interface", DataSource, Compute, "/instance", "Network interface of an instance");
capability!(data_source_storage_volume_snapshot, "opc_compute_storage_volume_snapshot", DataSource, Compute, "/storage/snapshot", "Storage volume snapshot");
capability!(data_source_vnic, "opc_compute_vnic", DataSource, Compute, "/network/v1/vnic", "Virtual NIC");

// Resources
capability!(resource_ip_network, "opc_compute_ip_network", Resource, Compute, "/network/v1/ipnetwork", "IP network");
capability!(resource_acl, "opc_compute_acl", Resource, Compute, "/network/v1/acl", "Access control list");
capability!(resource_image_list, "opc_compute_image_list", Resource, Compute, "/imagelist", "Machine image list");
capability!(resource_image_list_entry, "opc_compute_image_list_entry", Resource, Compute, "/imagelist", "Entry of a machine image list");
capability!(resource_instance, "opc_compute_instance", Resource, Compute, "/instance", "Compute instance");
capability!(resource_ip_address_reservation, "opc_compute_ip_address_reservation", Resource, Compute, "/network/v1/ipreservation", "IP address reservation on an IP network");
capability!(resource_ip_association, "opc_compute_ip_association", Resource, Compute, "/ip/association", "Association of a shared IP reservation with a vcable");
capability!(resource_ip_network_exchange, "opc_compute_ip_network_exchange", Resource, Compute, "/network/v1/ipnetworkexchange", "IP network exchange");
capability!(resource_ip_reservation, "opc_compute_ip_reservation", Resource, Compute, "/ip/reservation", "Shared network IP reservation");
capability!(resource_machine_image, "opc_compute_machine_image", Resource, Compute, "/machineimage", "Machine image");
capability!(resource_route, "opc_compute_route", Resource, Compute, "/network/v1/route", "Route");
capability!(resource_security_application, "opc_compute_security_application", Resource, Compute, "/secapplication", "Security application");
capability!(resource_security_association, "opc_compute_security_association", Resource, Compute, "/secassociation", "Security association");
capability!(resource_security_ip_list, "opc_compute_security_ip_list", Resource, Compute, "/seciplist", "Security IP list");
capability!(resource_security_list, "opc_compute_security_list", Resource, Compute, "/seclist", "Security list");
capability!(resource_security_rule, "opc_compute_security_rule", Resource, Compute, "/network/v1/secrule", "Security rule on an IP network");
capability!(resource_sec_rule, "opc_compute_sec_rule", Resource, Compute, "/secrule", "Security rule on the shared network");
capability!(resource_ssh_key, "opc_compute_ssh_key", Resource, Compute, "/sshkey", "SSH public key");
capability!(resource_storage_volume, "opc_compute_storage_volume", Resource, Compute, "/storage/volume", "Block storage volume");
capability!(resource_storage_volume_snapshot, "opc_compute_storage_volume_snapshot", Resource, Compute, "/storage/snapshot", "Storage volume snapshot");
capability!(resource_vnic_set, "opc_compute_vnic_set", Resource, Compute, "/network/v1/vnicset", "Virtual NIC set");
capability!(resource_security_protocol, "opc_compute_security_protocol", Resource, Compute, "/network/v1/secprotocol", "Security protocol");
capability!(resource_ip_address_prefix_set, "opc_compute_ip_address_prefix_set", Resource, Compute, "/network/v1/ipaddressprefixset", "IP address prefix set");
capability!(resource_ip_address_association, "opc_compute_ip_address_association", Resource, Compute, "/network/v1/ipassociation", "IP address association");
capability!(resource_snapshot, "opc_compute_snapshot", Resource, Compute, "/snapshot", "Instance snapshot");
capability!(resource_orchestrated_instance, "opc_compute_orchestrated_instance", Resource, Compute, "/platform/v1/orchestration", "Orchestrated instance");
capability!(resource_storage_container, "opc_storage_container", Resource, Storage, "", "Object storage container");
capability!(resource_storage_object, "opc_storage_object", Resource, Storage, "", "Object in a storage container");
capability!(resource_storage_attachment, "opc_compute_storage_attachment", Resource, Compute, "/storage/attachment", "Attachment of a storage volume to an instance");

/// Data source constructors, keyed by type name
const DATA_SOURCES: &[(&str, Constructor)] = &[
    ("opc_compute_image_list_entry", data_source_image_list_entry),
    ("opc_compute_machine_image", data_source_machine_image),
    ("opc_compute_network_interface", data_source_network_interface),
    ("opc_compute_storage_volume_snapshot", data_source_storage_volume_snapshot),
    ("opc_compute_vnic", data_source_vnic),
];

/// Resource constructors, keyed by type name
const RESOURCES: &[(&str, Constructor)] = &[
    ("opc_compute_ip_network", resource_ip_network),
    ("opc_compute_acl", resource_acl),
    ("opc_compute_image_list", resource_image_list),
    ("opc_compute_image_list_entry", resource_image_list_entry),
    ("opc_compute_instance", resource_instance),
    ("opc_compute_ip_address_reservation", resource_ip_address_reservation),
    ("opc_compute_ip_association", resource_ip_association),
    ("opc_compute_ip_network_exchange", resource_ip_network_exchange),
    ("opc_compute_ip_reservation", resource_ip_reservation),
    ("opc_compute_machine_image", resource_machine_image),
    ("opc_compute_route", resource_route),
    ("opc_compute_security_application", resource_security_application),
    ("opc_compute_security_association", resource_security_association),
    ("opc_compute_security_ip_list", resource_security_ip_list),
    ("opc_compute_security_list", resource_security_list),
    ("opc_compute_security_rule", resource_security_rule),
    ("opc_compute_sec_rule", resource_sec_rule),
    ("opc_compute_ssh_key", resource_ssh_key),
    ("opc_compute_storage_volume", resource_storage_volume),
    ("opc_compute_storage_volume_snapshot", resource_storage_volume_snapshot),
    ("opc_compute_vnic_set", resource_vnic_set),
    ("opc_compute_security_protocol", resource_security_protocol),
    ("opc_compute_ip_address_prefix_set", resource_ip_address_prefix_set),
    ("opc_compute_ip_address_association", resource_ip_address_association),
    ("opc_compute_snapshot", resource_snapshot),
    ("opc_compute_orchestrated_instance", resource_orchestrated_instance),
    ("opc_storage_container", resource_storage_container),
    ("opc_storage_object", resource_storage_object),
    ("opc_compute_storage_attachment", resource_storage_attachment),
];

/// Both lookup tables, built once
pub struct Registry {
    pub resources: HashMap<&'static str, CapabilityDef>,
    pub data_sources: HashMap<&'static str, CapabilityDef>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn build(table: &[(&'static str, Constructor)]) -> HashMap<&'static str, CapabilityDef> {
    table
        .iter()
        .map(|(name, constructor)| (*name, constructor()))
        .collect()
}

/// Get the registry (built from the constructor tables on first access)
pub fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let registry = Registry {
            resources: build(RESOURCES),
            data_sources: build(DATA_SOURCES),
        };
        tracing::debug!(
            "Registered {} resources and {} data sources",
            registry.resources.len(),
            registry.data_sources.len()
        );
        registry
    })
}

/// Get a resource definition by type name
pub fn get_resource(key: &str) -> Option<&'static CapabilityDef> {
    get_registry().resources.get(key)
}

/// Get a data source definition by type name
pub fn get_data_source(key: &str) -> Option<&'static CapabilityDef> {
    get_registry().data_sources.get(key)
}

/// All resource type names, sorted
pub fn resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry().resources.keys().copied().collect();
    keys.sort_unstable();
    keys
}

/// All data source type names, sorted
pub fn data_source_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry().data_sources.keys().copied().collect();
    keys.sort_unstable();
    keys
}
