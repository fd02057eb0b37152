use clap::Args;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mayfly_crd::Workflow;
use mayfly_submit::Submitter;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Workflow manifest to submit (YAML or JSON)
    pub manifest: PathBuf,

    /// Namespace to submit the workflow into
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Path to the kubeconfig holding the cluster credentials
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
}

pub async fn run_submit(args: SubmitArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.manifest)
        .wrap_err_with(|| format!("failed to read manifest '{}'", args.manifest.display()))?;
    let workflow: Workflow =
        serde_yaml::from_str(&raw).wrap_err("failed to parse workflow manifest")?;
    workflow.validate().wrap_err("invalid workflow manifest")?;

    let kubeconfig = resolve_kubeconfig(
        args.kubeconfig,
        std::env::var("KUBECONFIG").ok(),
        std::env::var("HOME").ok(),
    )?;
    debug!(
        kubeconfig = %kubeconfig.display(),
        namespace = %args.namespace,
        "submitting workflow"
    );

    let submitter = Submitter::new(args.namespace, kubeconfig);
    let finished = submitter.submit(workflow).await?;

    match finished.status.as_ref().and_then(|s| s.finished_at) {
        Some(finished_at) => println!(
            "Workflow {} {} at {}",
            finished.metadata.name,
            finished.phase(),
            finished_at
        ),
        None => println!("Workflow {} {}", finished.metadata.name, finished.phase()),
    }

    Ok(())
}

/// Pick the kubeconfig path: explicit flag, then KUBECONFIG (with `~`
/// expansion), then ~/.kube/config.
// Pure so the precedence is testable without touching the environment.
fn resolve_kubeconfig(
    flag: Option<PathBuf>,
    env_kubeconfig: Option<String>,
    home: Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }

    if let Some(env_path) = env_kubeconfig.filter(|p| !p.is_empty()) {
        let expanded = match (env_path.strip_prefix('~'), &home) {
            (Some(rest), Some(home)) => format!("{home}{rest}"),
            _ => env_path,
        };
        return Ok(PathBuf::from(expanded));
    }

    let home = home
        .ok_or_else(|| eyre!("cannot locate a kubeconfig: pass --kubeconfig or set KUBECONFIG"))?;
    Ok(PathBuf::from(home).join(".kube").join("config"))
}
