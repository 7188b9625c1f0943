//! Typed configuration entries.
//!
//! `ConfigEntry` is the closed set of kinds the gateway understands. Each
//! variant's shape is fully determined by its kind, and each shape decodes
//! itself from a [`Fields`] view through an explicit [`DecodeFields`] impl.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::decode::{decode_entry, DecodeFields, Fields};
use crate::duration::serde_duration;
use crate::{DecodeError, Value};

pub const SERVICE_DEFAULTS: &str = "service-defaults";
pub const PROXY_DEFAULTS: &str = "proxy-defaults";
pub const SERVICE_RESOLVER: &str = "service-resolver";
pub const SERVICE_SPLITTER: &str = "service-splitter";

/// Mesh gateway behaviour for a service or for all proxies.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MeshGatewayConfig {
    pub mode: String,
}

impl DecodeFields for MeshGatewayConfig {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Mode", &mut self.mode)
    }
}

/// `service-defaults`: per-service defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceConfigEntry {
    pub name: String,
    pub protocol: String,
    pub mesh_gateway: MeshGatewayConfig,
    #[serde(rename = "ExternalSNI")]
    pub external_sni: String,
    pub create_index: u64,
    pub modify_index: u64,
}

impl DecodeFields for ServiceConfigEntry {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Name", &mut self.name)?;
        fields.string("Protocol", &mut self.protocol)?;
        fields.object("MeshGateway", &mut self.mesh_gateway)?;
        fields.string("ExternalSNI", &mut self.external_sni)?;
        fields.uint("CreateIndex", &mut self.create_index)?;
        fields.uint("ModifyIndex", &mut self.modify_index)
    }
}

/// `proxy-defaults`: free-form proxy configuration shared by all proxies.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProxyConfigEntry {
    pub name: String,
    pub config: BTreeMap<String, Value>,
    pub mesh_gateway: MeshGatewayConfig,
    pub create_index: u64,
    pub modify_index: u64,
}

impl DecodeFields for ProxyConfigEntry {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Name", &mut self.name)?;
        fields.values("Config", &mut self.config)?;
        fields.object("MeshGateway", &mut self.mesh_gateway)?;
        fields.uint("CreateIndex", &mut self.create_index)?;
        fields.uint("ModifyIndex", &mut self.modify_index)
    }
}

/// A named subset of a service's instances.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceResolverSubset {
    pub filter: String,
    pub only_passing: bool,
}

impl DecodeFields for ServiceResolverSubset {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Filter", &mut self.filter)?;
        fields.bool("OnlyPassing", &mut self.only_passing)
    }
}

/// Send all resolution for a service somewhere else.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceResolverRedirect {
    pub service: String,
    pub service_subset: String,
    pub namespace: String,
    pub datacenter: String,
}

impl DecodeFields for ServiceResolverRedirect {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Service", &mut self.service)?;
        fields.string("ServiceSubset", &mut self.service_subset)?;
        fields.string("Namespace", &mut self.namespace)?;
        fields.string("Datacenter", &mut self.datacenter)
    }
}

/// Where to go when a subset has no healthy instances.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceResolverFailover {
    pub service: String,
    pub service_subset: String,
    pub datacenters: Vec<String>,
}

impl DecodeFields for ServiceResolverFailover {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Service", &mut self.service)?;
        fields.string("ServiceSubset", &mut self.service_subset)?;
        fields.strings("Datacenters", &mut self.datacenters)
    }
}

/// `service-resolver`: subsets, redirects and failover for a service.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceResolverConfigEntry {
    pub name: String,
    pub default_subset: String,
    pub subsets: BTreeMap<String, ServiceResolverSubset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<ServiceResolverRedirect>,
    pub failover: BTreeMap<String, ServiceResolverFailover>,
    #[serde(with = "serde_duration")]
    pub connect_timeout: Duration,
    pub create_index: u64,
    pub modify_index: u64,
}

impl DecodeFields for ServiceResolverConfigEntry {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Name", &mut self.name)?;
        fields.string("DefaultSubset", &mut self.default_subset)?;
        fields.object_map("Subsets", &mut self.subsets)?;
        fields.optional("Redirect", &mut self.redirect)?;
        fields.object_map("Failover", &mut self.failover)?;
        fields.duration("ConnectTimeout", &mut self.connect_timeout)?;
        fields.uint("CreateIndex", &mut self.create_index)?;
        fields.uint("ModifyIndex", &mut self.modify_index)
    }
}

/// One weighted leg of a traffic split.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSplit {
    pub weight: f32,
    pub service: String,
    pub service_subset: String,
}

impl DecodeFields for ServiceSplit {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.float("Weight", &mut self.weight)?;
        fields.string("Service", &mut self.service)?;
        fields.string("ServiceSubset", &mut self.service_subset)
    }
}

/// `service-splitter`: weighted traffic splitting for a service.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSplitterConfigEntry {
    pub name: String,
    pub splits: Vec<ServiceSplit>,
    pub create_index: u64,
    pub modify_index: u64,
}

impl DecodeFields for ServiceSplitterConfigEntry {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        fields.string("Name", &mut self.name)?;
        fields.object_list("Splits", &mut self.splits)?;
        fields.uint("CreateIndex", &mut self.create_index)?;
        fields.uint("ModifyIndex", &mut self.modify_index)
    }
}

/// A typed configuration entry. The variant is the entry's kind.
///
/// Serializes with a `Kind` tag next to the variant's PascalCase fields.
/// Deserializing goes through the same discriminator-first decoder as
/// request bodies, so `kind` and case-insensitive field names are accepted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "Kind")]
pub enum ConfigEntry {
    #[serde(rename = "service-defaults")]
    ServiceDefaults(ServiceConfigEntry),
    #[serde(rename = "proxy-defaults")]
    ProxyDefaults(ProxyConfigEntry),
    #[serde(rename = "service-resolver")]
    ServiceResolver(ServiceResolverConfigEntry),
    #[serde(rename = "service-splitter")]
    ServiceSplitter(ServiceSplitterConfigEntry),
}

macro_rules! each_variant {
    ($entry:expr, $inner:ident => $body:expr) => {
        match $entry {
            ConfigEntry::ServiceDefaults($inner) => $body,
            ConfigEntry::ProxyDefaults($inner) => $body,
            ConfigEntry::ServiceResolver($inner) => $body,
            ConfigEntry::ServiceSplitter($inner) => $body,
        }
    };
}

impl ConfigEntry {
    /// The kind identifier of this entry.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigEntry::ServiceDefaults(_) => SERVICE_DEFAULTS,
            ConfigEntry::ProxyDefaults(_) => PROXY_DEFAULTS,
            ConfigEntry::ServiceResolver(_) => SERVICE_RESOLVER,
            ConfigEntry::ServiceSplitter(_) => SERVICE_SPLITTER,
        }
    }

    pub fn name(&self) -> &str {
        each_variant!(self, e => &e.name)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        each_variant!(self, e => e.name = name)
    }

    pub fn create_index(&self) -> u64 {
        each_variant!(self, e => e.create_index)
    }

    pub fn modify_index(&self) -> u64 {
        each_variant!(self, e => e.modify_index)
    }

    /// Stamp the store's raft indexes onto the entry.
    pub fn set_indexes(&mut self, create_index: u64, modify_index: u64) {
        each_variant!(self, e => {
            e.create_index = create_index;
            e.modify_index = modify_index;
        })
    }
}

impl DecodeFields for ConfigEntry {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError> {
        each_variant!(self, e => e.decode_fields(fields))
    }
}

impl<'de> Deserialize<'de> for ConfigEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        decode_entry(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let entry = ConfigEntry::ServiceDefaults(ServiceConfigEntry {
            name: "web".to_string(),
            protocol: "http".to_string(),
            ..Default::default()
        });

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["Kind"], "service-defaults");
        assert_eq!(json["Name"], "web");
        assert_eq!(json["Protocol"], "http");
        assert_eq!(json["MeshGateway"]["Mode"], "");
        assert_eq!(json["ExternalSNI"], "");
    }

    #[test]
    fn resolver_timeout_serializes_as_string() {
        let entry = ConfigEntry::ServiceResolver(ServiceResolverConfigEntry {
            name: "api".to_string(),
            connect_timeout: Duration::from_secs(90),
            ..Default::default()
        });

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["ConnectTimeout"], "1m30s");
        assert!(json.get("Redirect").is_none());
    }

    #[test]
    fn deserialize_goes_through_decoder() {
        let entry: ConfigEntry = serde_json::from_str(
            r#"{"kind": "service-splitter", "name": "web", "splits": [{"weight": 100, "service": "web"}]}"#,
        )
        .unwrap();

        let ConfigEntry::ServiceSplitter(splitter) = entry else {
            panic!("expected splitter");
        };
        assert_eq!(splitter.name, "web");
        assert_eq!(splitter.splits.len(), 1);
        assert_eq!(splitter.splits[0].weight, 100.0);
    }

    #[test]
    fn deserialize_rejects_unknown_kind() {
        let result: Result<ConfigEntry, _> = serde_json::from_str(r#"{"Kind": "nope"}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid config entry kind: nope"));
    }

    #[test]
    fn serialized_entries_decode_back() {
        let entry = ConfigEntry::ProxyDefaults(ProxyConfigEntry {
            name: "global".to_string(),
            config: [("local_connect_timeout_ms".to_string(), Value::Integer(1000))]
                .into_iter()
                .collect(),
            mesh_gateway: MeshGatewayConfig {
                mode: "local".to_string(),
            },
            create_index: 4,
            modify_index: 9,
        });

        let text = serde_json::to_string(&entry).unwrap();
        let back: ConfigEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn name_and_indexes_accessors() {
        let mut entry = ConfigEntry::ServiceSplitter(ServiceSplitterConfigEntry::default());
        entry.set_name("billing");
        entry.set_indexes(3, 7);

        assert_eq!(entry.kind(), SERVICE_SPLITTER);
        assert_eq!(entry.name(), "billing");
        assert_eq!(entry.create_index(), 3);
        assert_eq!(entry.modify_index(), 7);
    }
}
