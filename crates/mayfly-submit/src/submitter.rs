//! Workflow submission
//!
//! One blocking operation: create the workflow resource, then consume
//! its change events until a terminal condition. No retries, no
//! polling, no state beyond the loop itself. A caller wanting a bounded
//! wait wraps the call in a deadline; dropping the future closes the
//! watch stream.

use crate::argo::ArgoBackend;
use crate::backend::{ResourceEvent, WorkflowBackend};
use crate::error::{Result, SubmitError};
use futures::TryStreamExt;
use mayfly_crd::Workflow;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Holds the connection parameters used for workflow submission
pub struct Submitter {
    namespace: String,
    kubeconfig: PathBuf,
}

impl Submitter {
    /// Create a submitter for the given namespace and credentials path
    pub fn new(namespace: impl Into<String>, kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            namespace: namespace.into(),
            kubeconfig: kubeconfig.into(),
        }
    }

    /// Submit a workflow and block until it reaches a terminal state.
    ///
    /// Returns the final observed workflow, or the first error of any
    /// stage (config resolution, creation, watch, stream, or a failing
    /// phase). Never returns a workflow still in a non-terminal phase.
    pub async fn submit(&self, workflow: Workflow) -> Result<Workflow> {
        let backend = ArgoBackend::connect(&self.kubeconfig, &self.namespace).await?;
        submit_and_wait(&backend, workflow).await
    }
}

/// Create `workflow` through `backend` and consume its change events
/// until a terminal condition.
///
/// Terminal conditions, in the order they are checked per event:
/// a Failed/Error phase ends the call with an error immediately, without
/// waiting for a finish timestamp; a set finish timestamp ends it with
/// the observed workflow. Bookmarks, foreign payloads, and workflows
/// with other names are skipped. A stream that closes early surfaces
/// `StreamClosed` rather than a non-terminal result.
pub async fn submit_and_wait<B>(backend: &B, workflow: Workflow) -> Result<Workflow>
where
    B: WorkflowBackend + ?Sized,
{
    let created = backend.create(&workflow).await?;
    let name = created.metadata.name.clone();
    info!(workflow = %name, "workflow submitted");

    let mut events = backend.watch(&name).await?;
    while let Some(event) = events.try_next().await? {
        let observed = match event {
            ResourceEvent::Workflow(wf) if wf.metadata.name == name => wf,
            ResourceEvent::Workflow(_) | ResourceEvent::Unrelated => continue,
        };

        let Some(status) = &observed.status else {
            debug!(workflow = %name, "no status reported yet");
            continue;
        };

        if status.phase.is_failed() {
            error!(workflow = %name, phase = %status.phase, "workflow failed");
            return Err(SubmitError::WorkflowFailed {
                name,
                phase: status.phase,
            });
        }

        if let Some(finished_at) = status.finished_at {
            info!(
                workflow = %name,
                phase = %status.phase,
                %finished_at,
                "workflow finished"
            );
            return Ok(observed);
        }

        debug!(workflow = %name, phase = %status.phase, "workflow still running");
    }

    Err(SubmitError::StreamClosed { name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EventStream;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use kube::core::ErrorResponse;
    use mayfly_crd::{WorkflowPhase, WorkflowStatus};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that rejects creation or replays a scripted event list
    #[derive(Default)]
    struct ScriptedBackend {
        reject_create: bool,
        events: Mutex<Vec<Result<ResourceEvent>>>,
        create_calls: AtomicUsize,
        watch_calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn replaying(events: Vec<Result<ResourceEvent>>) -> Self {
            Self {
                events: Mutex::new(events),
                ..Default::default()
            }
        }

        fn rejecting() -> Self {
            Self {
                reject_create: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl WorkflowBackend for ScriptedBackend {
        async fn create(&self, workflow: &Workflow) -> Result<Workflow> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_create {
                return Err(SubmitError::Submission {
                    name: workflow.metadata.name.clone(),
                    source: kube::Error::Api(ErrorResponse {
                        status: "Failure".to_string(),
                        message: "admission denied".to_string(),
                        reason: "Forbidden".to_string(),
                        code: 403,
                    }),
                });
            }

            let mut created = workflow.clone();
            if created.metadata.name.is_empty() {
                created.metadata.name = format!(
                    "{}abc12",
                    created.metadata.generate_name.clone().unwrap_or_default()
                );
            }
            Ok(created)
        }

        async fn watch(&self, _name: &str) -> Result<EventStream> {
            self.watch_calls.fetch_add(1, Ordering::SeqCst);
            let events = std::mem::take(&mut *self.events.lock().unwrap());
            Ok(futures::stream::iter(events).boxed())
        }
    }

    fn observed(name: &str, phase: WorkflowPhase, finished: Option<i64>) -> ResourceEvent {
        let mut wf = Workflow::new(name);
        wf.status = Some(WorkflowStatus {
            phase,
            finished_at: finished.map(|secs| Utc.timestamp_opt(secs, 0).unwrap()),
            ..Default::default()
        });
        ResourceEvent::Workflow(wf)
    }

    #[tokio::test]
    async fn test_returns_workflow_on_finish_timestamp() {
        let backend = ScriptedBackend::replaying(vec![
            Ok(observed("job-1", WorkflowPhase::Running, None)),
            Ok(observed("job-1", WorkflowPhase::Succeeded, Some(1_700_000_000))),
        ]);

        let finished = submit_and_wait(&backend, Workflow::new("job-1"))
            .await
            .unwrap();

        assert_eq!(finished.metadata.name, "job-1");
        assert_eq!(finished.phase(), WorkflowPhase::Succeeded);
        assert_eq!(
            finished.status.unwrap().finished_at,
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_failed_phase_short_circuits() {
        // The failing phase arrives without a finish timestamp and must
        // still end the call immediately.
        let backend = ScriptedBackend::replaying(vec![
            Ok(observed("job-2", WorkflowPhase::Failed, None)),
            Ok(observed("job-2", WorkflowPhase::Succeeded, Some(1_700_000_000))),
        ]);

        let err = submit_and_wait(&backend, Workflow::new("job-2"))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("job-2"));
        assert!(message.contains("failed"));
        assert!(matches!(
            err,
            SubmitError::WorkflowFailed {
                phase: WorkflowPhase::Failed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_error_phase_is_a_failure() {
        let backend =
            ScriptedBackend::replaying(vec![Ok(observed("job-3", WorkflowPhase::Error, None))]);

        let err = submit_and_wait(&backend, Workflow::new("job-3"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmitError::WorkflowFailed {
                phase: WorkflowPhase::Error,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unrelated_events_never_alter_the_outcome() {
        // Bookmarks, a finished workflow under another name, and a
        // status-less observation are all skipped.
        let backend = ScriptedBackend::replaying(vec![
            Ok(ResourceEvent::Unrelated),
            Ok(observed("job-10", WorkflowPhase::Failed, Some(1_600_000_000))),
            Ok(ResourceEvent::Workflow(Workflow::new("job-1"))),
            Ok(observed("job-1", WorkflowPhase::Succeeded, Some(1_700_000_000))),
        ]);

        let finished = submit_and_wait(&backend, Workflow::new("job-1"))
            .await
            .unwrap();

        assert_eq!(finished.metadata.name, "job-1");
        assert_eq!(finished.phase(), WorkflowPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_creation_failure_never_opens_a_watch() {
        let backend = ScriptedBackend::rejecting();

        let err = submit_and_wait(&backend, Workflow::new("job-4"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("job-4"));
        assert!(matches!(err, SubmitError::Submission { .. }));
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.watch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generated_name_is_used_for_the_watch() {
        let backend = ScriptedBackend::replaying(vec![Ok(observed(
            "hello-abc12",
            WorkflowPhase::Succeeded,
            Some(1_700_000_000),
        ))]);

        let finished = submit_and_wait(&backend, Workflow::generated("hello-"))
            .await
            .unwrap();

        assert_eq!(finished.metadata.name, "hello-abc12");
    }

    #[tokio::test]
    async fn test_stream_closure_is_an_error() {
        let backend =
            ScriptedBackend::replaying(vec![Ok(observed("job-5", WorkflowPhase::Running, None))]);

        let err = submit_and_wait(&backend, Workflow::new("job-5"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::StreamClosed { .. }));
        assert!(err.to_string().contains("job-5"));
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let backend = ScriptedBackend::replaying(vec![
            Ok(observed("job-6", WorkflowPhase::Running, None)),
            Err(SubmitError::Stream {
                name: "job-6".to_string(),
                source: kube::Error::Api(ErrorResponse {
                    status: "Failure".to_string(),
                    message: "too old resource version".to_string(),
                    reason: "Expired".to_string(),
                    code: 410,
                }),
            }),
        ]);

        let err = submit_and_wait(&backend, Workflow::new("job-6"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Stream { .. }));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_fails_before_any_creation() {
        let submitter = Submitter::new("default", "/definitely/not/a/kubeconfig");

        let err = submitter.submit(Workflow::new("job-7")).await.unwrap_err();

        assert!(matches!(err, SubmitError::Config { .. }));
        assert!(err.to_string().contains("/definitely/not/a/kubeconfig"));
    }
}
