//! Scanned resource records and graph nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw per-resource attributes, keyed by attribute name.
pub type ConfigMap = BTreeMap<String, Value>;

/// Resource tags.
pub type TagMap = BTreeMap<String, String>;

/// Type tag given to placeholders whose real type cannot be inferred.
pub const EXTERNAL_RESOURCE_TYPE: &str = "external_resource";

/// One record from the scanning subsystem, before reference resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub tags: TagMap,
}

impl RawResource {
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = Some(arn.into());
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// A resource inside a `ResourceGraph`.
///
/// Nodes are created once during assembly. The graph only ever hands out
/// shared references, so a node cannot change after it has been added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: String,
    pub resource_type: String,
    pub arn: Option<String>,
    pub region: String,
    pub config: ConfigMap,
    pub tags: TagMap,
    pub name: Option<String>,
    /// Out-of-scope placeholder standing in for an unresolved reference.
    pub external: bool,
}

impl ResourceNode {
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            arn: None,
            region: region.into(),
            config: ConfigMap::new(),
            tags: TagMap::new(),
            name: None,
            external: false,
        }
    }

    /// Placeholder for a reference pointing outside the scanned scope.
    pub fn external(id: impl Into<String>, resource_type: impl Into<String>, arn: Option<String>) -> Self {
        let mut node = Self::new(id, resource_type, String::new());
        node.arn = arn;
        node.external = true;
        node
    }

    /// Build a node from a scanned record. `arn` falls back to the `arn`
    /// config attribute, `name` to the `Name` tag.
    pub fn from_raw(raw: &RawResource) -> Self {
        let arn = raw.arn.clone().or_else(|| {
            raw.config
                .get("arn")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        let name = raw.name.clone().or_else(|| raw.tags.get("Name").cloned());
        Self {
            id: raw.id.clone(),
            resource_type: raw.resource_type.clone(),
            arn,
            region: raw.region.clone(),
            config: raw.config.clone(),
            tags: raw.tags.clone(),
            name,
            external: false,
        }
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = Some(arn.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Human label: name if known, id otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
