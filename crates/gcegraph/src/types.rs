//! Output model: the resource descriptors handed to Deployment Manager.
//!
//! Field names here are the wire contract of the orchestration engine and are
//! serialized exactly as `name`, `type` / `action`, `properties`,
//! `metadata.dependsOn` and `metadata.runtimePolicy`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource type for a GCE instance.
pub const INSTANCE_TYPE: &str = "compute.v1.instance";

/// Resource type for a firewall rule.
pub const FIREWALL_TYPE: &str = "compute.v1.firewall";

/// Prefix of the compute instance action methods.
pub const INSTANCE_ACTION_PREFIX: &str = "gcp-types/compute-v1:compute.instances.";

/// Power action invoked on an existing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceAction {
    Start,
    Stop,
}

impl InstanceAction {
    /// The action that leaves a VM in the requested power state.
    pub fn for_power_state(start_vm: bool) -> Self {
        if start_vm { Self::Start } else { Self::Stop }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    /// Full action path, e.g. `gcp-types/compute-v1:compute.instances.stop`.
    pub fn method(&self) -> String {
        format!("{}{}", INSTANCE_ACTION_PREFIX, self.as_str())
    }
}

/// Whether a descriptor creates a resource or invokes an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create (or update) a resource of this type.
    #[serde(rename = "type")]
    Type(String),
    /// Invoke this method on an existing resource.
    #[serde(rename = "action")]
    Action(String),
}

/// When the engine should run a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimePolicy {
    UpdateAlways,
}

/// Execution hints attached to a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_policy: Vec<RuntimePolicy>,
}

impl ResourceMetadata {
    /// Metadata that re-runs the descriptor on every deployment update.
    pub fn update_always() -> Self {
        Self {
            depends_on: Vec::new(),
            runtime_policy: vec![RuntimePolicy::UpdateAlways],
        }
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }
}

/// Boot disk initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub source_image: String,
}

/// A disk attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub device_name: String,
    #[serde(rename = "type")]
    pub disk_type: String,
    pub boot: bool,
    pub auto_delete: bool,
    pub initialize_params: InitializeParams,
}

/// External address configuration on a network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub access_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub network: String,
    pub access_configs: Vec<AccessConfig>,
}

/// Properties of a `compute.v1.instance` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProperties {
    pub zone: String,
    pub machine_type: String,
    pub disks: Vec<AttachedDisk>,
    pub network_interfaces: Vec<NetworkInterface>,
    /// User metadata, passed through untouched apart from injected edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Properties of an instance start/stop action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceActionProperties {
    pub instance: String,
    pub zone: String,
}

/// Operation-specific payload of a descriptor.
///
/// Serialized without a tag; when reading a descriptor back the variant is
/// chosen from its [`Operation`], never from the shape of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Properties {
    Instance(InstanceProperties),
    InstanceAction(InstanceActionProperties),
    /// Provider-specific fields passed through verbatim (firewall rules).
    Open(Map<String, Value>),
}

/// One node of the provisioning graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResource")]
pub struct Resource {
    pub name: String,
    #[serde(flatten)]
    pub operation: Operation,
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResourceMetadata>,
}

/// A descriptor as read from JSON, before its payload is typed.
#[derive(Deserialize)]
struct RawResource {
    name: String,
    #[serde(flatten)]
    operation: Operation,
    properties: Map<String, Value>,
    #[serde(default)]
    metadata: Option<ResourceMetadata>,
}

impl TryFrom<RawResource> for Resource {
    type Error = serde_json::Error;

    fn try_from(raw: RawResource) -> Result<Self, Self::Error> {
        let properties = match &raw.operation {
            Operation::Type(t) if t == INSTANCE_TYPE => {
                Properties::Instance(serde_json::from_value(Value::Object(raw.properties))?)
            }
            Operation::Action(_) => {
                Properties::InstanceAction(serde_json::from_value(Value::Object(raw.properties))?)
            }
            Operation::Type(_) => Properties::Open(raw.properties),
        };
        Ok(Self {
            name: raw.name,
            operation: raw.operation,
            properties,
            metadata: raw.metadata,
        })
    }
}

impl Resource {
    /// A descriptor that creates a resource of `resource_type`.
    pub fn create(
        name: impl Into<String>,
        resource_type: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            name: name.into(),
            operation: Operation::Type(resource_type.into()),
            properties,
            metadata: None,
        }
    }

    /// A descriptor that invokes `action` on an existing resource.
    pub fn action(name: impl Into<String>, action: impl Into<String>, properties: Properties) -> Self {
        Self {
            name: name.into(),
            operation: Operation::Action(action.into()),
            properties,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ResourceMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Names this descriptor must wait for.
    pub fn depends_on(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|m| m.depends_on.as_slice())
            .unwrap_or(&[])
    }

    /// Resource type, if this descriptor creates a resource.
    pub fn resource_type(&self) -> Option<&str> {
        match &self.operation {
            Operation::Type(t) => Some(t),
            Operation::Action(_) => None,
        }
    }

    /// Action method, if this descriptor invokes one.
    pub fn action_method(&self) -> Option<&str> {
        match &self.operation {
            Operation::Action(a) => Some(a),
            Operation::Type(_) => None,
        }
    }
}

/// The complete output document: `{"resources": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub resources: Vec<Resource>,
}

impl Deployment {
    /// Find a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Descriptor names in output order.
    pub fn names(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }
}

impl<'a> IntoIterator for &'a Deployment {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
