//! Workflow CRD types
//!
//! These types are compatible with the Argo Workflows CRD format so that
//! resources built here can be submitted to, and read back from, a live
//! workflow controller.

use crate::{CrdError, ObjectMeta, Result, TypeMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Workflow resource representing a remotely executed multi-step job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Type metadata (apiVersion, kind)
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    /// Object metadata (name, namespace, labels, etc.)
    pub metadata: ObjectMeta,

    /// Workflow specification
    pub spec: WorkflowSpec,

    /// Workflow status (set by the controller)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
}

impl Workflow {
    /// Create a new Workflow with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::workflow(),
            metadata: ObjectMeta::new(name),
            spec: WorkflowSpec::default(),
            status: None,
        }
    }

    /// Create a new Workflow whose name the server generates from a prefix
    pub fn generated(prefix: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::workflow(),
            metadata: ObjectMeta::generated(prefix),
            spec: WorkflowSpec::default(),
            status: None,
        }
    }

    /// Set the entrypoint template name
    pub fn with_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.spec.entrypoint = Some(entrypoint.into());
        self
    }

    /// Append an opaque template body to the spec
    pub fn with_template(mut self, template: Value) -> Self {
        self.spec.templates.push(template);
        self
    }

    /// Validate the workflow before submission
    pub fn validate(&self) -> Result<()> {
        if self.metadata.name.is_empty()
            && self
                .metadata
                .generate_name
                .as_deref()
                .unwrap_or_default()
                .is_empty()
        {
            return Err(CrdError::MissingField("metadata.name".to_string()));
        }

        if let Some(entrypoint) = &self.spec.entrypoint {
            if entrypoint.is_empty() {
                return Err(CrdError::InvalidFieldValue {
                    field: "spec.entrypoint".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resource name as observed (empty until the server assigns one)
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Current phase, `Unknown` when the controller has not reported one
    pub fn phase(&self) -> WorkflowPhase {
        self.status.as_ref().map(|s| s.phase).unwrap_or_default()
    }

    /// Check whether the finish timestamp has been set
    pub fn is_finished(&self) -> bool {
        self.status
            .as_ref()
            .map(|s| s.finished_at.is_some())
            .unwrap_or(false)
    }

    /// Check whether the workflow is in a failing phase
    pub fn is_failed(&self) -> bool {
        self.phase().is_failed()
    }
}

/// Workflow specification
///
/// The execution graph (templates, arguments) is opaque to this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    /// Name of the template the controller starts from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,

    /// Template bodies, carried verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<Value>,

    /// Workflow-level arguments, carried verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,

    /// Service account the controller runs the workflow as
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

/// Workflow status as reported by the controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    /// Coarse lifecycle phase
    #[serde(default)]
    pub phase: WorkflowPhase,

    /// Human-readable detail for the current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Completed/total node count, e.g. "2/3"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,

    /// Start time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Finish time; unset until the workflow completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Workflow phase
///
/// The controller reports an empty string before it has picked the
/// workflow up; that maps to `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    /// No phase reported yet
    #[default]
    #[serde(rename = "")]
    Unknown,
    /// Accepted but not yet running
    Pending,
    /// At least one step is executing
    Running,
    /// All steps completed successfully
    Succeeded,
    /// A step failed
    Failed,
    /// The controller errored while driving the workflow
    Error,
}

impl WorkflowPhase {
    /// Phases from which no further transition occurs
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Error)
    }

    /// Failed or Error
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Error => "Error",
        };
        f.write_str(s)
    }
}
