//! `crewdeploy check`: pre-flight status check.

use crewdeploy_core::{DeploymentPipeline, Target};

use super::Context;

pub async fn run(ctx: &Context) -> Result<(), String> {
    let pipeline = DeploymentPipeline::from_config(&ctx.config, Target::Crew).map_err(|e| e.to_string())?;
    let report = pipeline
        .check(&ctx.credentials)
        .await
        .map_err(|e| e.to_string())?;

    println!("Endpoint: {}", report.endpoint);
    match report.status {
        Some(status) => println!("Status:   HTTP {} ({})", status, report.reachability),
        None => println!("Status:   no response ({})", report.reachability),
    }
    println!("Detail:   {}", report.detail);

    if report.reachable() {
        println!("\n✅ Service reachable, credentials accepted");
        Ok(())
    } else {
        Err(format!("Service not reachable: {}", report.detail))
    }
}
