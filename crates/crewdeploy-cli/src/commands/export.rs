//! `crewdeploy export`: local configuration files and deployment guide.

use std::path::Path;

use crewdeploy_core::deploy::ArtifactStore;
use crewdeploy_core::export;

use super::{load_crew, load_workflow, Context};

pub async fn run(ctx: &Context, crew_file: Option<&Path>, workflow_file: Option<&Path>) -> Result<(), String> {
    let crew = load_crew(crew_file)?;
    let graph = load_workflow(workflow_file)?;
    let store = ArtifactStore::new(&ctx.config.output_dir);

    let summary = export::export_local(&store, &ctx.config, &crew, &graph, &ctx.credentials)
        .await
        .map_err(|e| e.to_string())?;

    println!("✅ Exported {} file(s):", summary.files.len());
    for path in &summary.files {
        println!("   - {}", path.display());
    }
    if !summary.missing_credentials.is_empty() {
        println!(
            "\n⚠️  Missing credentials: {}",
            summary.missing_credentials.join(", ")
        );
    }
    Ok(())
}
