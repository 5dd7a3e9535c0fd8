//! Local export: everything needed to deploy by hand, without touching the
//! network. Runs whether or not credentials are configured, and never
//! writes a secret value.

use std::path::PathBuf;

use serde_json::json;

use crate::config::DeployConfig;
use crate::credentials::CredentialSet;
use crate::deploy::ArtifactStore;
use crate::error::Result;
use crate::models::Crew;
use crate::workflow::WorkflowGraph;

pub const CREW_CONFIG_FILE: &str = "crew-config.json";
pub const WORKFLOW_FILE: &str = "workflow.json";
pub const TRACING_CONFIG_FILE: &str = "tracing-config.json";
pub const GUIDE_FILE: &str = "DEPLOYMENT.md";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub missing_credentials: Vec<String>,
}

pub async fn export_local(
    store: &ArtifactStore,
    config: &DeployConfig,
    crew: &Crew,
    workflow: &WorkflowGraph,
    credentials: &CredentialSet,
) -> Result<ExportSummary> {
    let mut files = Vec::new();

    files.push(store.write_export_json(CREW_CONFIG_FILE, &crew.to_json()?).await?);

    let workflow_json = workflow.to_json()?;
    files.push(store.write_export_json(WORKFLOW_FILE, &workflow_json).await?);

    let tracing_config = json!({
        "project": config.tracing_project,
        "tracing": true,
        "agents": serde_json::to_value(&crew.agents)?,
        "workflow": workflow_json,
    });
    files.push(
        store
            .write_export_json(TRACING_CONFIG_FILE, &tracing_config)
            .await?,
    );

    let guide = render_guide(config, crew, credentials);
    files.push(store.write_export(GUIDE_FILE, guide.as_bytes()).await?);

    tracing::info!(
        "[Export] Wrote {} files to '{}' ({} agents, {} tasks, {} workflow nodes)",
        files.len(),
        store.base_dir().display(),
        crew.agents.len(),
        crew.tasks.len(),
        workflow.nodes.len()
    );

    Ok(ExportSummary {
        files,
        missing_credentials: credentials.missing(),
    })
}

/// Markdown guide for manual deployment. Only credential names appear in
/// it, never their values.
pub fn render_guide(config: &DeployConfig, crew: &Crew, credentials: &CredentialSet) -> String {
    let names = credentials.names();
    let status = |name: &str| {
        if credentials.is_configured(name) {
            "configured"
        } else {
            "missing"
        }
    };

    let mut out = String::new();
    out.push_str(&format!("# Deploying {}\n\n", crew.name));
    out.push_str("## Credentials\n\n");
    for name in names.all() {
        out.push_str(&format!("- `{}`: {}\n", name, status(name)));
    }

    out.push_str("\n## Crew\n\n");
    out.push_str(&format!(
        "- Agents: {}\n- Tasks: {}\n- Process: {}\n",
        crew.agents.len(),
        crew.tasks.len(),
        crew.process
    ));

    out.push_str("\n## Manual deployment\n\n");
    out.push_str(&format!(
        "Upload `{}` through the dashboard, or post it directly:\n\n",
        CREW_CONFIG_FILE
    ));
    out.push_str("```bash\n");
    out.push_str(&format!("curl -X POST {} \\\n", config.crew.primary));
    out.push_str(&format!(
        "  -H \"Authorization: Bearer ${}\" \\\n",
        names.bearer_token
    ));
    out.push_str("  -H \"Content-Type: application/json\" \\\n");
    out.push_str(&format!("  -d @{}\n", CREW_CONFIG_FILE));
    out.push_str("```\n\n");
    out.push_str(&format!(
        "Payloads that could not be sent are kept under `{}/pending/`.\n",
        config.output_dir.display()
    ));
    out
}
