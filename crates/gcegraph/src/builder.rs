//! Resource graph builder
//!
//! Turns a [`BuildRequest`] into the ordered descriptor list. Per VM the
//! output is:
//!
//! 1. `initial-stop-<vm>` when the VM is in the shutdown set
//! 2. the `compute.v1.instance` resource `<vm>`
//! 3. `final-start-<vm>` or `final-stop-<vm>`, depending on `start_vm`
//!
//! followed by one `compute.v1.firewall` resource per firewall rule.

use crate::options::BuilderOptions;
use crate::request::{BuildRequest, FirewallRuleRequest, VmRequest};
use crate::types::{
    AccessConfig, AttachedDisk, Deployment, FIREWALL_TYPE, INSTANCE_TYPE, InitializeParams,
    InstanceAction, InstanceActionProperties, InstanceProperties, NetworkInterface, Properties,
    Resource, ResourceMetadata,
};
use serde_json::Value;

/// Key under which dependency edges are merged into VM metadata.
pub const DEPENDS_ON_KEY: &str = "dependsOn";

/// Name of the descriptor that stops `vm_name` before it is created/updated.
pub fn initial_stop_name(vm_name: &str) -> String {
    format!("initial-stop-{}", vm_name)
}

/// Name of the descriptor that leaves `vm_name` in its requested power state.
pub fn final_action_name(action: InstanceAction, vm_name: &str) -> String {
    format!("final-{}-{}", action.as_str(), vm_name)
}

/// Canonical machine type path, e.g. `zones/us-central1-a/machineTypes/n1-standard-1`.
pub fn machine_type_path(zone: &str, machine_type: &str) -> String {
    format!("zones/{}/machineTypes/{}", zone, machine_type)
}

/// Builds provisioning graphs. Holds no state between builds.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: BuilderOptions,
}

impl GraphBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    /// Build the descriptor list for a parsed request.
    pub fn build(&self, request: &BuildRequest) -> Deployment {
        let mut resources =
            Vec::with_capacity(request.vms.len() * 3 + request.firewall_rules.len());

        for vm in &request.vms {
            self.push_vm(vm, request.is_shutdown(&vm.name), &mut resources);
        }

        for rule in &request.firewall_rules {
            resources.push(firewall_resource(rule));
        }

        log::info!(
            "Built {} resources for {} VMs and {} firewall rules",
            resources.len(),
            request.vms.len(),
            request.firewall_rules.len()
        );

        Deployment { resources }
    }

    fn push_vm(&self, vm: &VmRequest, stop_first: bool, resources: &mut Vec<Resource>) {
        // Metadata is finalized before the instance descriptor is built from it.
        let mut metadata = vm.metadata.clone();
        let mut instance_metadata = None;

        if stop_first {
            let stop = instance_action(
                initial_stop_name(&vm.name),
                InstanceAction::Stop,
                vm,
                ResourceMetadata::update_always(),
            );
            metadata.insert(
                DEPENDS_ON_KEY.to_string(),
                Value::Array(vec![Value::String(stop.name.clone())]),
            );
            // properties.metadata carries the merged edge as part of the instance
            // payload; the engine only sequences on descriptor metadata, so the
            // edge is emitted in both places.
            instance_metadata = Some(ResourceMetadata::default().depends_on(stop.name.clone()));
            log::debug!("{}: stop before update via {}", vm.name, stop.name);
            resources.push(stop);
        }

        let properties = InstanceProperties {
            zone: vm.zone.clone(),
            machine_type: machine_type_path(&vm.zone, &vm.machine_type),
            disks: vec![self.boot_disk(&vm.boot_image_name)],
            network_interfaces: vec![self.network_interface()],
            metadata: (!metadata.is_empty()).then_some(metadata),
        };
        let mut instance =
            Resource::create(vm.name.clone(), INSTANCE_TYPE, Properties::Instance(properties));
        instance.metadata = instance_metadata;
        log::debug!("{}: instance {}", vm.name, instance.name);
        resources.push(instance);

        let action = InstanceAction::for_power_state(vm.start_vm);
        let last = instance_action(
            final_action_name(action, &vm.name),
            action,
            vm,
            ResourceMetadata::update_always().depends_on(vm.name.clone()),
        );
        log::debug!("{}: final {} via {}", vm.name, action.as_str(), last.name);
        resources.push(last);
    }

    fn boot_disk(&self, image: &str) -> AttachedDisk {
        AttachedDisk {
            device_name: self.options.boot_disk_device_name.clone(),
            disk_type: "PERSISTENT".to_string(),
            boot: true,
            auto_delete: true,
            initialize_params: InitializeParams {
                source_image: image.to_string(),
            },
        }
    }

    fn network_interface(&self) -> NetworkInterface {
        NetworkInterface {
            network: self.options.network.clone(),
            access_configs: vec![AccessConfig {
                name: self.options.external_access_config_name.clone(),
                access_type: "ONE_TO_ONE_NAT".to_string(),
            }],
        }
    }
}

fn instance_action(
    name: String,
    action: InstanceAction,
    vm: &VmRequest,
    metadata: ResourceMetadata,
) -> Resource {
    Resource::action(
        name,
        action.method(),
        Properties::InstanceAction(InstanceActionProperties {
            instance: vm.name.clone(),
            zone: vm.zone.clone(),
        }),
    )
    .with_metadata(metadata)
}

fn firewall_resource(rule: &FirewallRuleRequest) -> Resource {
    log::debug!("firewall rule {}", rule.name);
    Resource::create(
        rule.name.clone(),
        FIREWALL_TYPE,
        Properties::Open(rule.properties.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Operation, RuntimePolicy};
    use serde_json::json;

    fn vm(name: &str, start_vm: bool) -> Value {
        json!({
            "name": name,
            "zone": "us-central1-a",
            "machine_type": "n1-standard-1",
            "boot_image_name": "debian-10",
            "start_vm": start_vm
        })
    }

    fn build(document: Value) -> Deployment {
        let request = BuildRequest::from_value(&document).unwrap();
        GraphBuilder::default().build(&request)
    }

    fn referencing<'a>(deployment: &'a Deployment, vm_name: &str) -> Vec<&'a Resource> {
        deployment
            .iter()
            .filter(|r| {
                r.name == vm_name
                    || matches!(&r.properties, Properties::InstanceAction(p) if p.instance == vm_name)
            })
            .collect()
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(initial_stop_name("web1"), "initial-stop-web1");
        assert_eq!(
            final_action_name(InstanceAction::Start, "web1"),
            "final-start-web1"
        );
        assert_eq!(
            final_action_name(InstanceAction::Stop, "web1"),
            "final-stop-web1"
        );
        assert_eq!(
            machine_type_path("us-central1-a", "n1-standard-1"),
            "zones/us-central1-a/machineTypes/n1-standard-1"
        );
    }

    #[test]
    fn test_shutdown_vm_yields_stop_instance_start() {
        let deployment = build(json!({
            "gce_instances": [vm("web1", true)],
            "vm_names_to_shutdown": ["web1"]
        }));

        assert_eq!(
            deployment.names(),
            vec!["initial-stop-web1", "web1", "final-start-web1"]
        );

        let stop = deployment.get("initial-stop-web1").unwrap();
        assert_eq!(
            stop.action_method(),
            Some("gcp-types/compute-v1:compute.instances.stop")
        );
        assert!(stop.depends_on().is_empty());
        assert_eq!(
            stop.metadata.as_ref().unwrap().runtime_policy,
            vec![RuntimePolicy::UpdateAlways]
        );

        let instance = deployment.get("web1").unwrap();
        assert_eq!(instance.depends_on(), ["initial-stop-web1".to_string()]);
        match &instance.properties {
            Properties::Instance(p) => {
                assert_eq!(
                    p.metadata.as_ref().map(|m| Value::Object(m.clone())),
                    Some(json!({"dependsOn": ["initial-stop-web1"]}))
                );
            }
            other => panic!("Expected instance properties, got {other:?}"),
        }

        let start = deployment.get("final-start-web1").unwrap();
        assert_eq!(
            start.action_method(),
            Some("gcp-types/compute-v1:compute.instances.start")
        );
        assert_eq!(start.depends_on(), ["web1".to_string()]);
    }

    #[test]
    fn test_worked_example_wire_shape() {
        let deployment = build(json!({
            "gce_instances": [vm("web1", true)],
            "vm_names_to_shutdown": ["web1"]
        }));

        assert_eq!(
            serde_json::to_value(&deployment).unwrap(),
            json!({"resources": [
                {
                    "name": "initial-stop-web1",
                    "action": "gcp-types/compute-v1:compute.instances.stop",
                    "properties": {"instance": "web1", "zone": "us-central1-a"},
                    "metadata": {"runtimePolicy": ["UPDATE_ALWAYS"]}
                },
                {
                    "name": "web1",
                    "type": "compute.v1.instance",
                    "properties": {
                        "zone": "us-central1-a",
                        "machineType": "zones/us-central1-a/machineTypes/n1-standard-1",
                        "disks": [{
                            "deviceName": "boot",
                            "type": "PERSISTENT",
                            "boot": true,
                            "autoDelete": true,
                            "initializeParams": {"sourceImage": "debian-10"}
                        }],
                        "networkInterfaces": [{
                            "network": "global/networks/default",
                            "accessConfigs": [{"name": "External NAT", "type": "ONE_TO_ONE_NAT"}]
                        }],
                        "metadata": {"dependsOn": ["initial-stop-web1"]}
                    },
                    "metadata": {"dependsOn": ["initial-stop-web1"]}
                },
                {
                    "name": "final-start-web1",
                    "action": "gcp-types/compute-v1:compute.instances.start",
                    "properties": {"instance": "web1", "zone": "us-central1-a"},
                    "metadata": {"dependsOn": ["web1"], "runtimePolicy": ["UPDATE_ALWAYS"]}
                }
            ]})
        );
    }

    #[test]
    fn test_vm_not_in_shutdown_set_yields_two() {
        let deployment = build(json!({
            "gce_instances": [vm("a", false), vm("b", true)],
            "vm_names_to_shutdown": ["b"]
        }));

        let a = referencing(&deployment, "a");
        assert_eq!(a.len(), 2);
        assert_eq!(deployment.get("a").unwrap().metadata, None);
        assert!(deployment.get("initial-stop-a").is_none());
        assert_eq!(referencing(&deployment, "b").len(), 3);

        let stop = deployment.get("final-stop-a").unwrap();
        assert_eq!(
            stop.operation,
            Operation::Action("gcp-types/compute-v1:compute.instances.stop".to_string())
        );
        assert_eq!(stop.depends_on(), ["a".to_string()]);
    }

    #[test]
    fn test_empty_metadata_not_attached() {
        let deployment = build(json!({"gce_instances": [vm("a", true)]}));
        match &deployment.get("a").unwrap().properties {
            Properties::Instance(p) => assert!(p.metadata.is_none()),
            other => panic!("Expected instance properties, got {other:?}"),
        }
    }

    #[test]
    fn test_user_metadata_passed_through_and_merged() {
        let mut item = vm("a", false);
        item["metadata"] = json!({"items": [{"key": "startup-script", "value": "echo hi"}]});

        let plain = build(json!({"gce_instances": [item.clone()]}));
        match &plain.get("a").unwrap().properties {
            Properties::Instance(p) => assert_eq!(
                p.metadata.as_ref().map(|m| Value::Object(m.clone())),
                Some(json!({"items": [{"key": "startup-script", "value": "echo hi"}]}))
            ),
            other => panic!("Expected instance properties, got {other:?}"),
        }

        let stopped = build(json!({"gce_instances": [item], "vm_names_to_shutdown": ["a"]}));
        match &stopped.get("a").unwrap().properties {
            Properties::Instance(p) => {
                let metadata = p.metadata.as_ref().unwrap();
                let keys: Vec<&str> = metadata.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["items", "dependsOn"]);
                assert_eq!(metadata["dependsOn"], json!(["initial-stop-a"]));
            }
            other => panic!("Expected instance properties, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_shutdown_name_ignored() {
        let deployment = build(json!({
            "gce_instances": [vm("a", true)],
            "vm_names_to_shutdown": ["ghost", "a"]
        }));

        assert!(deployment.get("initial-stop-ghost").is_none());
        assert!(referencing(&deployment, "ghost").is_empty());
        assert_eq!(
            deployment.names(),
            vec!["initial-stop-a", "a", "final-start-a"]
        );
        assert!(deployment.validate().is_ok());
    }

    #[test]
    fn test_shutdown_and_stop_yields_two_stops() {
        let deployment = build(json!({
            "gce_instances": [vm("db", false)],
            "vm_names_to_shutdown": ["db"]
        }));
        assert_eq!(
            deployment.names(),
            vec!["initial-stop-db", "db", "final-stop-db"]
        );
    }

    #[test]
    fn test_firewall_rule_descriptor() {
        let deployment = build(json!({
            "gce_instances": [],
            "firewall_rules": [{"name": "allow-ssh", "sourceRanges": ["0.0.0.0/0"]}]
        }));

        assert_eq!(
            serde_json::to_value(&deployment).unwrap(),
            json!({"resources": [{
                "name": "allow-ssh",
                "type": "compute.v1.firewall",
                "properties": {"sourceRanges": ["0.0.0.0/0"]}
            }]})
        );
    }

    #[test]
    fn test_output_order_vms_then_rules() {
        let deployment = build(json!({
            "firewall_rules": [{"name": "fw-2"}, {"name": "fw-1", "priority": 100}],
            "gce_instances": [vm("b", true), vm("a", false)]
        }));

        assert_eq!(
            deployment.names(),
            vec!["b", "final-start-b", "a", "final-stop-a", "fw-2", "fw-1"]
        );
        assert!(deployment.get("fw-2").unwrap().metadata.is_none());
    }

    #[test]
    fn test_build_is_idempotent() {
        let document = json!({
            "gce_instances": [vm("a", true), vm("b", false)],
            "vm_names_to_shutdown": ["b"],
            "firewall_rules": [{"name": "fw", "allowed": [{"IPProtocol": "tcp"}]}]
        });
        let request = BuildRequest::from_value(&document).unwrap();
        let builder = GraphBuilder::default();

        let first = builder.build(&request);
        let second = builder.build(&request);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_custom_options() {
        let options = BuilderOptions {
            network: "global/networks/prod".to_string(),
            ..BuilderOptions::default()
        };
        let request = BuildRequest::from_value(&json!({"gce_instances": [vm("a", true)]})).unwrap();
        let deployment = GraphBuilder::new(options).build(&request);

        match &deployment.get("a").unwrap().properties {
            Properties::Instance(p) => {
                assert_eq!(p.network_interfaces[0].network, "global/networks/prod");
                assert_eq!(p.disks[0].device_name, "boot");
            }
            other => panic!("Expected instance properties, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_request() {
        let deployment = GraphBuilder::default().build(&BuildRequest::default());
        assert!(deployment.is_empty());
        assert_eq!(
            serde_json::to_value(&deployment).unwrap(),
            json!({"resources": []})
        );
    }
}
