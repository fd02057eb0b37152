//! Error types for workflow submission
//!
//! Every fallible stage of a submission has its own variant so callers
//! can tell config resolution, creation, watch establishment, stream
//! failures, and remote workflow failure apart.

use mayfly_crd::WorkflowPhase;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for workflow submission
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Cluster credentials could not be resolved
    #[error("failed to load kubeconfig from '{}'", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// The cluster client could not be constructed
    #[error("failed to build cluster client")]
    Client {
        #[source]
        source: kube::Error,
    },

    /// The remote rejected resource creation
    #[error("failed to submit workflow '{name}'")]
    Submission {
        name: String,
        #[source]
        source: kube::Error,
    },

    /// Change notifications could not be established
    #[error("failed to watch workflow '{name}'")]
    Watch {
        name: String,
        #[source]
        source: kube::Error,
    },

    /// The established watch stream delivered an error
    #[error("watch stream for workflow '{name}' failed")]
    Stream {
        name: String,
        #[source]
        source: kube::Error,
    },

    /// The remote reports a failing phase
    #[error("workflow '{name}' failed (phase: {phase})")]
    WorkflowFailed { name: String, phase: WorkflowPhase },

    /// The watch stream closed before a terminal condition was observed
    #[error("watch stream for workflow '{name}' closed before completion")]
    StreamClosed { name: String },
}

/// Result type for submission operations
pub type Result<T> = std::result::Result<T, SubmitError>;
