use crate::config::Target;
use crate::error::Result;
use crate::models::Crew;
use crate::validation::ValidationReport;
use crate::workflow::{self, WorkflowGraph};

/// Something that can be deployed: a crew or a workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployPayload {
    Crew(Crew),
    Workflow(WorkflowGraph),
}

impl DeployPayload {
    pub fn target(&self) -> Target {
        match self {
            DeployPayload::Crew(_) => Target::Crew,
            DeployPayload::Workflow(_) => Target::Workflow,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeployPayload::Crew(crew) => &crew.name,
            DeployPayload::Workflow(graph) => &graph.name,
        }
    }

    pub fn validate(&self) -> ValidationReport {
        match self {
            DeployPayload::Crew(crew) => crew.violations(),
            DeployPayload::Workflow(graph) => workflow::validate(graph),
        }
    }

    /// The request body sent to the service.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self {
            DeployPayload::Crew(crew) => crew.to_json(),
            DeployPayload::Workflow(graph) => graph.to_json(),
        }
    }
}

impl From<Crew> for DeployPayload {
    fn from(crew: Crew) -> Self {
        DeployPayload::Crew(crew)
    }
}

impl From<WorkflowGraph> for DeployPayload {
    fn from(graph: WorkflowGraph) -> Self {
        DeployPayload::Workflow(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_payload_dispatch() {
        let crew: DeployPayload = presets::build_crew().unwrap().into();
        assert_eq!(crew.target(), Target::Crew);
        assert_eq!(crew.name(), presets::CREW_NAME);
        assert!(crew.validate().is_valid());
        assert_eq!(crew.to_json().unwrap()["process"], "sequential");

        let wf: DeployPayload = presets::build_workflow().unwrap().into();
        assert_eq!(wf.target(), Target::Workflow);
        assert!(wf.validate().is_valid());
        assert_eq!(wf.to_json().unwrap()["nodes"].as_array().unwrap().len(), 5);
    }
}
