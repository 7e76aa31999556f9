//! # gcegraph
//!
//! Builds Deployment Manager resource graphs for GCE VMs and firewall rules.
//!
//! Given a request document listing VMs, an optional set of VMs to stop
//! before they are updated, and optional firewall rules, this crate produces
//! the ordered `{"resources": [...]}` document the orchestration engine runs.
//! Lifecycle actions are chained to each VM with `dependsOn` edges:
//!
//! ```text
//! initial-stop-web1 ──▶ web1 ──▶ final-start-web1
//! ```
//!
//! Building is pure: the same request always yields the same graph, and
//! nothing is executed.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//!
//! let document = json!({
//!     "gce_instances": [{
//!         "name": "web1",
//!         "zone": "us-central1-a",
//!         "machine_type": "n1-standard-1",
//!         "boot_image_name": "debian-10",
//!         "start_vm": true
//!     }],
//!     "vm_names_to_shutdown": ["web1"]
//! });
//!
//! let deployment = gcegraph::build(&document)?;
//! assert_eq!(
//!     deployment.names(),
//!     vec!["initial-stop-web1", "web1", "final-start-web1"]
//! );
//! assert_eq!(deployment.get("final-start-web1").unwrap().depends_on(), ["web1".to_string()]);
//! # Ok::<(), gcegraph::Error>(())
//! ```

#![warn(clippy::all)]

pub mod builder;
pub mod error;
pub mod graph;
pub mod options;
pub mod request;
pub mod types;

pub use builder::{GraphBuilder, final_action_name, initial_stop_name, machine_type_path};
pub use error::{Entity, Error, ErrorCategory, Result};
pub use options::BuilderOptions;
pub use request::{BuildRequest, FirewallRuleRequest, VmRequest};
pub use types::{
    Deployment, InstanceAction, InstanceActionProperties, InstanceProperties, Operation,
    Properties, Resource, ResourceMetadata, RuntimePolicy,
};

/// Parse a request document and build its graph with default options.
pub fn build(document: &serde_json::Value) -> Result<Deployment> {
    let request = BuildRequest::from_value(document)?;
    Ok(GraphBuilder::default().build(&request))
}
