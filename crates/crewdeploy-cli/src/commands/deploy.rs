//! `crewdeploy deploy`: run the full deployment pipeline for one target.

use std::path::Path;

use crewdeploy_core::deploy::{Attempt, Persisted};
use crewdeploy_core::workflow;
use crewdeploy_core::{DeployPayload, DeploymentOutcome, DeploymentPipeline, Target};

use super::{load_crew, load_workflow, Context};

pub async fn run(
    ctx: &Context,
    target: Target,
    skip_check: bool,
    crew_file: Option<&Path>,
    workflow_file: Option<&Path>,
) -> Result<(), String> {
    let payload: DeployPayload = match target {
        Target::Crew => load_crew(crew_file)?.into(),
        Target::Workflow => {
            let crew = load_crew(crew_file)?;
            let graph = load_workflow(workflow_file)?;
            let report = workflow::validate_bindings(&graph, &crew);
            if !report.is_valid() {
                let details: Vec<String> = report.violations.iter().map(|v| v.to_string()).collect();
                return Err(format!(
                    "Workflow '{}' does not match crew '{}': {}",
                    graph.name,
                    crew.name,
                    details.join("; ")
                ));
            }
            graph.into()
        }
    };

    println!("📦 Deploying {} '{}'", target, payload.name());

    let pipeline = DeploymentPipeline::from_config(&ctx.config, target)
        .map_err(|e| e.to_string())?
        .skip_check(skip_check);

    let outcome = pipeline
        .run(&payload, &ctx.credentials)
        .await
        .map_err(|e| e.to_string())?;

    for attempt in outcome.attempts() {
        print_attempt(attempt);
    }

    match &outcome {
        DeploymentOutcome::Deployed { record, artifact, .. } => {
            println!("\n🎉 Deployed via {} (HTTP {})", record.endpoint, record.status);
            print_artifact("Record", artifact);
            Ok(())
        }
        DeploymentOutcome::Skipped { reason, artifact } => {
            println!("\n⏭️  Deployment skipped: {}", reason);
            print_artifact("Payload", artifact);
            println!("   Submit it by hand once the service is available.");
            Ok(())
        }
        DeploymentOutcome::DeploymentFailed { artifact, .. } => Err(match artifact {
            Ok(path) => format!(
                "Both endpoints rejected the deployment; payload saved to {}",
                path.display()
            ),
            Err(e) => format!(
                "Both endpoints rejected the deployment and the payload could not be saved: {}",
                e
            ),
        }),
    }
}

fn print_artifact(label: &str, artifact: &Persisted) {
    match artifact {
        Ok(path) => println!("💾 {} saved to: {}", label, path.display()),
        Err(e) => println!("⚠️  {} could not be saved: {}", label, e),
    }
}

fn print_attempt(attempt: &Attempt) {
    match (&attempt.failure, attempt.status) {
        (None, Some(status)) => println!("   {} {} -> HTTP {}", attempt.stage, attempt.endpoint, status),
        (Some(failure), _) => println!("   {} {} -> {}", attempt.stage, attempt.endpoint, failure),
        (None, None) => println!("   {} {} -> no response", attempt.stage, attempt.endpoint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewdeploy_core::credentials::{CredentialNames, CredentialSet};
    use crewdeploy_core::{DeployConfig, Endpoints};
    use std::collections::HashMap;

    fn closed_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/v1/workflows", addr)
    }

    fn context(dir: &Path) -> Context {
        let url = closed_url();
        let config = DeployConfig {
            output_dir: dir.to_path_buf(),
            workflow: Some(Endpoints::new(url.clone(), url.clone(), url)),
            ..DeployConfig::default()
        };
        Context {
            credentials: CredentialSet::from_map(CredentialNames::default(), &HashMap::new()),
            config,
        }
    }

    #[tokio::test]
    async fn test_workflow_bound_to_unknown_agent_is_not_deployed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wf.json");
        std::fs::write(
            &path,
            r#"{
                "name": "stray",
                "nodes": [
                    {"id": "in", "type": "input", "config": {}},
                    {"id": "work", "type": "agent", "agent": "Nobody", "config": {"task": "Do it"}},
                    {"id": "out", "type": "output", "config": {}}
                ],
                "edges": [
                    {"from": "in", "to": "work"},
                    {"from": "work", "to": "out"}
                ]
            }"#,
        )
        .unwrap();
        let out = dir.path().join("out");
        let ctx = context(&out);

        let err = run(&ctx, Target::Workflow, true, None, Some(&path)).await.unwrap_err();

        assert!(err.contains("unknown agent 'Nobody'"));
        assert!(!out.join("pending").exists());
    }

    #[tokio::test]
    async fn test_builtin_workflow_without_credentials_is_saved_for_later() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        run(&ctx, Target::Workflow, true, None, None).await.unwrap();

        assert!(dir.path().join("pending").exists());
    }
}
