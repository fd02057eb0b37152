//! Kubernetes-backed workflow backend
//!
//! Talks to an Argo-compatible workflow controller through its CRD
//! group. The workflow kind is accessed dynamically so this crate does
//! not need the controller's generated client types.

use crate::backend::{EventStream, ResourceEvent, WorkflowBackend};
use crate::error::{Result, SubmitError};
use async_trait::async_trait;
use futures::StreamExt;
use kube::{
    Client, Config,
    api::{Api, PostParams, WatchEvent, WatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    core::{ApiResource, DynamicObject},
};
use mayfly_crd::{API_GROUP, API_VERSION, VERSION, Workflow};
use serde_json::json;
use std::path::Path;
use tracing::{debug, warn};

/// The ApiResource for the Workflow CRD
fn workflow_resource() -> ApiResource {
    ApiResource {
        group: API_GROUP.to_string(),
        version: VERSION.to_string(),
        kind: "Workflow".to_string(),
        api_version: API_VERSION.to_string(),
        plural: "workflows".to_string(),
    }
}

/// Workflow backend speaking to a live cluster
pub struct ArgoBackend {
    namespace: String,
    api: Api<DynamicObject>,
}

impl ArgoBackend {
    /// Build a backend from an already-constructed client
    pub fn new(client: Client, namespace: &str) -> Self {
        let api = Api::namespaced_with(client, namespace, &workflow_resource());
        Self {
            namespace: namespace.to_string(),
            api,
        }
    }

    /// Resolve the kubeconfig at `path` and build a client scoped to
    /// `namespace`.
    ///
    /// A missing or unparsable credentials file fails here, before any
    /// network traffic.
    pub async fn connect(path: impl AsRef<Path>, namespace: &str) -> Result<Self> {
        let path = path.as_ref();
        let kubeconfig = Kubeconfig::read_from(path).map_err(|source| SubmitError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|source| SubmitError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        let client = Client::try_from(config).map_err(|source| SubmitError::Client { source })?;

        debug!(namespace = %namespace, "cluster client ready");
        Ok(Self::new(client, namespace))
    }
}

#[async_trait]
impl WorkflowBackend for ArgoBackend {
    async fn create(&self, workflow: &Workflow) -> Result<Workflow> {
        let attempted = if workflow.metadata.name.is_empty() {
            workflow.metadata.generate_name.clone().unwrap_or_default()
        } else {
            workflow.metadata.name.clone()
        };

        let mut obj = DynamicObject::new(&workflow.metadata.name, &workflow_resource())
            .data(json!({ "spec": workflow.spec }));
        obj.metadata.namespace = Some(self.namespace.clone());
        if workflow.metadata.name.is_empty() {
            obj.metadata.name = None;
            obj.metadata.generate_name = workflow.metadata.generate_name.clone();
        }
        if !workflow.metadata.labels.is_empty() {
            obj.metadata.labels = Some(workflow.metadata.labels.clone().into_iter().collect());
        }
        if !workflow.metadata.annotations.is_empty() {
            obj.metadata.annotations =
                Some(workflow.metadata.annotations.clone().into_iter().collect());
        }

        let created = self
            .api
            .create(&PostParams::default(), &obj)
            .await
            .map_err(|source| SubmitError::Submission {
                name: attempted.clone(),
                source,
            })?;

        parse_workflow(created).map_err(|e| SubmitError::Submission {
            name: attempted,
            source: kube::Error::SerdeError(e),
        })
    }

    async fn watch(&self, name: &str) -> Result<EventStream> {
        // Exact-name field selector; a label or prefix match would leak
        // events from identically-prefixed workflows.
        let wp = WatchParams::default().fields(&format!("metadata.name={name}"));
        let stream = self
            .api
            .watch(&wp, "0")
            .await
            .map_err(|source| SubmitError::Watch {
                name: name.to_string(),
                source,
            })?;

        let name = name.to_string();
        let events = stream.map(move |item| match item {
            Ok(WatchEvent::Added(obj))
            | Ok(WatchEvent::Modified(obj))
            | Ok(WatchEvent::Deleted(obj)) => Ok(decode_event(obj)),
            Ok(WatchEvent::Bookmark(_)) => Ok(ResourceEvent::Unrelated),
            Ok(WatchEvent::Error(resp)) => Err(SubmitError::Stream {
                name: name.clone(),
                source: kube::Error::Api(resp),
            }),
            Err(source) => Err(SubmitError::Stream {
                name: name.clone(),
                source,
            }),
        });

        Ok(events.boxed())
    }
}

/// Map a watch payload into the event union.
///
/// Payloads of foreign kinds, or ones that do not decode as a Workflow,
/// become `Unrelated` so the consuming loop can skip them without
/// aborting.
fn decode_event(obj: DynamicObject) -> ResourceEvent {
    let is_workflow = obj
        .types
        .as_ref()
        .map(|t| t.kind == "Workflow")
        .unwrap_or(false);
    if !is_workflow {
        return ResourceEvent::Unrelated;
    }

    match parse_workflow(obj) {
        Ok(workflow) => ResourceEvent::Workflow(workflow),
        Err(e) => {
            warn!(error = %e, "skipping event payload that does not decode as a Workflow");
            ResourceEvent::Unrelated
        }
    }
}

fn parse_workflow(obj: DynamicObject) -> std::result::Result<Workflow, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(obj)?)
}
