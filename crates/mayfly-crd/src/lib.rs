//! Workflow resource types
//!
//! This crate provides serde types compatible with the Argo Workflows
//! CRD format for submission and status observation.
//!
//! # API Group
//!
//! All types use the `argoproj.io/v1alpha1` API group.
//!
//! # Resources
//!
//! - `Workflow` - A multi-step job tracked by phase and finish timestamp
//!
//! The execution graph inside a workflow spec (templates, arguments) is
//! carried opaquely; this crate never interprets it.

pub mod error;
pub mod metadata;
pub mod workflow;

pub use error::*;
pub use metadata::*;
pub use workflow::*;

/// API version for workflow resources
pub const API_VERSION: &str = "argoproj.io/v1alpha1";

/// API group for workflow resources
pub const API_GROUP: &str = "argoproj.io";

/// API version string
pub const VERSION: &str = "v1alpha1";
