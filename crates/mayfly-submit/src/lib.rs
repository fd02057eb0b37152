//! Workflow submission client
//!
//! This crate submits a workflow resource to an Argo-compatible
//! Kubernetes workflow engine and blocks until the workflow reaches a
//! terminal state.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                   Submitter                        │
//! │   namespace + kubeconfig path                      │
//! │                      │                             │
//! │                      ▼                             │
//! │  ┌──────────────────────────────────────────────┐  │
//! │  │        WorkflowBackend (trait seam)          │  │
//! │  │   ArgoBackend (live cluster) | test double   │  │
//! │  └──────────────────────────────────────────────┘  │
//! │                      │                             │
//! │                      ▼                             │
//! │  ┌──────────────────────────────────────────────┐  │
//! │  │   create → name-filtered watch → event loop  │  │
//! │  │   until Failed/Error phase or finish time    │  │
//! │  └──────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mayfly_crd::Workflow;
//! use mayfly_submit::Submitter;
//!
//! let submitter = Submitter::new("argo", "/home/me/.kube/config");
//! let finished = submitter.submit(Workflow::new("job-1")).await?;
//! println!("{} {}", finished.metadata.name, finished.phase());
//! ```

pub mod argo;
pub mod backend;
pub mod error;
pub mod submitter;

pub use argo::*;
pub use backend::*;
pub use error::*;
pub use submitter::*;
