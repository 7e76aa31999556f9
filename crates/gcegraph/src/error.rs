//! Error types for graph construction.
//!
//! Input errors point at the offending entity and field so the request
//! document can be fixed. Graph errors describe a descriptor set the
//! orchestration engine would refuse to run.

use std::fmt;

/// Result type alias for gcegraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure, used for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request document is missing data or has the wrong shape.
    Input,
    /// The produced descriptors do not form a runnable graph.
    Graph,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Input => "Invalid request document",
            Self::Graph => "Inconsistent resource graph",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Input => "Fix the named field in the request document and run again",
            Self::Graph => "Make VM and firewall rule names unique across the request",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// The part of the request document an input error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// The top-level document.
    Document,
    /// An entry of `gce_instances`.
    Vm {
        /// Position in the list.
        index: usize,
        /// VM name, when it could be read.
        name: Option<String>,
    },
    /// An entry of `firewall_rules`.
    FirewallRule {
        /// Position in the list.
        index: usize,
        /// Rule name, when it could be read.
        name: Option<String>,
    },
    /// An entry of `vm_names_to_shutdown`.
    ShutdownName {
        /// Position in the list.
        index: usize,
    },
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Vm { index, name: None } => write!(f, "gce_instances[{index}]"),
            Self::Vm {
                index,
                name: Some(name),
            } => write!(f, "gce_instances[{index}] ({name})"),
            Self::FirewallRule { index, name: None } => write!(f, "firewall_rules[{index}]"),
            Self::FirewallRule {
                index,
                name: Some(name),
            } => write!(f, "firewall_rules[{index}] ({name})"),
            Self::ShutdownName { index } => write!(f, "vm_names_to_shutdown[{index}]"),
        }
    }
}

/// Errors that can occur while parsing a request or checking a graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field is absent.
    #[error("{entity} is missing required field `{field}`")]
    MissingField {
        /// Where the field was expected.
        entity: Entity,
        /// Field name.
        field: &'static str,
    },

    /// A field is present but holds the wrong kind of value.
    #[error("{entity} field `{field}` must be {expected}")]
    InvalidField {
        /// Where the field was found.
        entity: Entity,
        /// Field name.
        field: &'static str,
        /// Human description of the expected kind, e.g. "a string".
        expected: &'static str,
    },

    /// The document could not be read as a request at all.
    #[error("invalid request document: {0}")]
    InvalidDocument(String),

    /// Two descriptors share a name.
    #[error("duplicate resource name: {0}")]
    DuplicateName(String),

    /// A `dependsOn` entry names no descriptor in the graph.
    #[error("resource {resource} depends on unknown resource {target}")]
    UnknownDependency {
        /// Descriptor holding the edge.
        resource: String,
        /// Name that could not be resolved.
        target: String,
    },

    /// The dependency edges form a cycle.
    #[error("dependency cycle among resources: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

impl Error {
    /// Create a missing-field error.
    pub fn missing(entity: Entity, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }

    /// Create a wrong-kind error.
    pub fn invalid(entity: Entity, field: &'static str, expected: &'static str) -> Self {
        Self::InvalidField {
            entity,
            field,
            expected,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingField { .. } | Error::InvalidField { .. } | Error::InvalidDocument(_) => {
                ErrorCategory::Input
            }
            Error::DuplicateName(_) | Error::UnknownDependency { .. } | Error::Cycle(_) => {
                ErrorCategory::Graph
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_vm_and_field() {
        let err = Error::missing(
            Entity::Vm {
                index: 2,
                name: Some("web1".to_string()),
            },
            "zone",
        );
        assert_eq!(
            err.to_string(),
            "gce_instances[2] (web1) is missing required field `zone`"
        );
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_missing_field_without_name() {
        let err = Error::missing(Entity::FirewallRule { index: 0, name: None }, "name");
        assert_eq!(
            err.to_string(),
            "firewall_rules[0] is missing required field `name`"
        );
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::invalid(Entity::Document, "gce_instances", "an array");
        assert_eq!(
            err.to_string(),
            "document field `gce_instances` must be an array"
        );
    }

    #[test]
    fn test_graph_error_category() {
        assert_eq!(
            Error::DuplicateName("web1".to_string()).category(),
            ErrorCategory::Graph
        );
        let err = Error::UnknownDependency {
            resource: "final-stop-a".to_string(),
            target: "a".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Graph);
        assert!(err.to_string().contains("final-stop-a"));
    }

    #[test]
    fn test_cycle_display() {
        let err = Error::Cycle(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "dependency cycle among resources: a, b");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidDocument(_)));
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_category_advice() {
        assert!(!ErrorCategory::Input.advice().is_empty());
        assert!(!ErrorCategory::Graph.advice().is_empty());
        assert_eq!(format!("{}", ErrorCategory::Input), "Invalid request document");
    }
}
