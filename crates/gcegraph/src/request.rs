//! Request document parsing.
//!
//! The document is read field by field from a `serde_json::Value` rather than
//! through derived `Deserialize`, so every failure names the VM or rule and
//! the field involved.

use crate::error::{Entity, Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One VM to create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRequest {
    pub name: String,
    pub zone: String,
    pub machine_type: String,
    pub boot_image_name: String,
    /// Desired power state after the deployment runs.
    pub start_vm: bool,
    /// Instance metadata; empty when the field is absent or null.
    pub metadata: Map<String, Value>,
}

/// One firewall rule: its name plus provider-specific properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRuleRequest {
    pub name: String,
    /// Every field of the rule except `name`, in document order.
    pub properties: Map<String, Value>,
}

/// A parsed request document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub vms: Vec<VmRequest>,
    /// VMs stopped before their create/update runs.
    pub shutdown: BTreeSet<String>,
    pub firewall_rules: Vec<FirewallRuleRequest>,
}

impl BuildRequest {
    /// Parse a request from an already-decoded document.
    pub fn from_value(document: &Value) -> Result<Self> {
        let doc = document
            .as_object()
            .ok_or_else(|| Error::InvalidDocument("top level must be an object".to_string()))?;

        let instances = match doc.get("gce_instances") {
            None | Some(Value::Null) => return Err(Error::missing(Entity::Document, "gce_instances")),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Error::invalid(Entity::Document, "gce_instances", "an array")),
        };

        let vms = instances
            .iter()
            .enumerate()
            .map(|(index, item)| VmRequest::from_value(index, item))
            .collect::<Result<Vec<_>>>()?;

        let mut shutdown = BTreeSet::new();
        for (index, item) in optional_array(doc, "vm_names_to_shutdown")?
            .iter()
            .enumerate()
        {
            let name = item
                .as_str()
                .ok_or_else(|| Error::invalid(Entity::ShutdownName { index }, "name", "a string"))?;
            shutdown.insert(name.to_string());
        }

        let firewall_rules = optional_array(doc, "firewall_rules")?
            .iter()
            .enumerate()
            .map(|(index, item)| FirewallRuleRequest::from_value(index, item))
            .collect::<Result<Vec<_>>>()?;

        for name in &shutdown {
            if !vms.iter().any(|vm| &vm.name == name) {
                log::warn!("vm_names_to_shutdown names unknown VM '{}', ignoring", name);
            }
        }

        Ok(Self {
            vms,
            shutdown,
            firewall_rules,
        })
    }

    /// Whether `vm_name` must be stopped before its create/update.
    pub fn is_shutdown(&self, vm_name: &str) -> bool {
        self.shutdown.contains(vm_name)
    }
}

impl VmRequest {
    fn from_value(index: usize, value: &Value) -> Result<Self> {
        let unnamed = Entity::Vm { index, name: None };
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidDocument(format!("{} must be an object", unnamed)))?;

        let name = required_str(obj, "name", &unnamed)?;
        let entity = Entity::Vm {
            index,
            name: Some(name.to_string()),
        };

        let start_vm = match obj.get("start_vm") {
            None | Some(Value::Null) => return Err(Error::missing(entity, "start_vm")),
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(Error::invalid(entity, "start_vm", "a boolean")),
        };

        let metadata = match obj.get("metadata") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(m)) => m.clone(),
            Some(_) => return Err(Error::invalid(entity, "metadata", "an object")),
        };

        Ok(Self {
            name: name.to_string(),
            zone: required_str(obj, "zone", &entity)?.to_string(),
            machine_type: required_str(obj, "machine_type", &entity)?.to_string(),
            boot_image_name: required_str(obj, "boot_image_name", &entity)?.to_string(),
            start_vm,
            metadata,
        })
    }
}

impl FirewallRuleRequest {
    fn from_value(index: usize, value: &Value) -> Result<Self> {
        let unnamed = Entity::FirewallRule { index, name: None };
        let mut properties = value
            .as_object()
            .cloned()
            .ok_or_else(|| Error::InvalidDocument(format!("{} must be an object", unnamed)))?;

        let name = match properties.shift_remove("name") {
            None | Some(Value::Null) => return Err(Error::missing(unnamed, "name")),
            Some(Value::String(s)) => s,
            Some(_) => return Err(Error::invalid(unnamed, "name", "a string")),
        };

        Ok(Self { name, properties })
    }
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
    entity: &Entity,
) -> Result<&'a str> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(Error::missing(entity.clone(), field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Error::invalid(entity.clone(), field, "a string")),
    }
}

fn optional_array<'a>(doc: &'a Map<String, Value>, field: &'static str) -> Result<&'a [Value]> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(Error::invalid(Entity::Document, field, "an array")),
    }
}
