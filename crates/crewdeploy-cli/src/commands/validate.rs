//! `crewdeploy validate`: check crew and workflow invariants offline.

use std::path::Path;

use crewdeploy_core::workflow;
use crewdeploy_core::ValidationReport;

use super::{load_crew, load_workflow};

pub fn run(crew_file: Option<&Path>, workflow_file: Option<&Path>) -> Result<(), String> {
    let crew = load_crew(crew_file)?;
    let graph = load_workflow(workflow_file)?;

    let crew_report = crew.violations();
    print_report(&format!("Crew '{}'", crew.name), &crew_report);
    println!(
        "   {} agent(s), {} task(s), process: {}",
        crew.agents.len(),
        crew.tasks.len(),
        crew.process
    );

    let mut graph_report = workflow::validate(&graph);
    graph_report.extend(workflow::validate_bindings(&graph, &crew));
    print_report(&format!("Workflow '{}'", graph.name), &graph_report);
    println!("   {} node(s), {} edge(s)", graph.nodes.len(), graph.edges.len());

    let total = crew_report.len() + graph_report.len();
    if total == 0 {
        Ok(())
    } else {
        Err(format!("{} violation(s) found", total))
    }
}

fn print_report(label: &str, report: &ValidationReport) {
    if report.is_valid() {
        println!("✅ {} is valid", label);
    } else {
        println!("❌ {} has {} violation(s)", label, report.len());
        for violation in &report.violations {
            println!("   - {}", violation);
        }
    }
}
