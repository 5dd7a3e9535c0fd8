//! Builders for crews and workflow graphs.
//!
//! Both builders are pure: no I/O, same input gives the same output. They
//! refuse to return a value that breaks a reference invariant, failing with
//! `DeployError::Configuration` instead.

use std::collections::HashSet;

use crate::error::{DeployError, Result};
use crate::models::{Agent, Crew, Embedder, ProcessMode, Task};
use crate::validation::Violation;
use crate::workflow::{Edge, Node, WorkflowGraph};

pub struct CrewBuilder {
    crew: Crew,
}

impl CrewBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            crew: Crew {
                name: name.into(),
                description: String::new(),
                agents: Vec::new(),
                tasks: Vec::new(),
                process: ProcessMode::Sequential,
                memory: true,
                cache: true,
                max_rpm: crate::models::crew::default_max_rpm(),
                embedder: None,
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.crew.description = description.into();
        self
    }

    pub fn agent(mut self, agent: Agent) -> Self {
        self.crew.agents.push(agent);
        self
    }

    /// Tasks run in the order they are added.
    pub fn task(mut self, task: Task) -> Self {
        self.crew.tasks.push(task);
        self
    }

    pub fn process(mut self, process: ProcessMode) -> Self {
        self.crew.process = process;
        self
    }

    pub fn memory(mut self, enabled: bool) -> Self {
        self.crew.memory = enabled;
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.crew.cache = enabled;
        self
    }

    pub fn max_rpm(mut self, max_rpm: u32) -> Self {
        self.crew.max_rpm = max_rpm;
        self
    }

    pub fn embedder(mut self, embedder: Embedder) -> Self {
        self.crew.embedder = Some(embedder);
        self
    }

    pub fn build(self) -> Result<Crew> {
        let report = self.crew.violations();
        if !report.is_valid() {
            return Err(configuration_error(
                &format!("crew '{}'", self.crew.name),
                &report.violations,
            ));
        }
        Ok(self.crew)
    }
}

pub struct WorkflowBuilder {
    graph: WorkflowGraph,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            graph: WorkflowGraph {
                name: name.into(),
                description: String::new(),
                nodes: Vec::new(),
                edges: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.graph.description = description.into();
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.graph.nodes.push(node);
        self
    }

    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.edges.push(Edge::new(from, to));
        self
    }

    /// Connect the given node ids in order.
    pub fn chain<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        for pair in ids.windows(2) {
            self.graph.edges.push(Edge::new(pair[0].clone(), pair[1].clone()));
        }
        self
    }

    /// Fails on duplicate node ids and on edges naming unknown nodes.
    /// Path-shape checks are left to `workflow::validate`.
    pub fn build(self) -> Result<WorkflowGraph> {
        let mut violations = Vec::new();
        let mut ids = HashSet::new();
        for node in &self.graph.nodes {
            if !ids.insert(node.id.as_str()) {
                violations.push(Violation::DuplicateNode {
                    id: node.id.clone(),
                });
            }
        }
        for edge in &self.graph.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !ids.contains(endpoint.as_str()) {
                    violations.push(Violation::DanglingEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        if !violations.is_empty() {
            return Err(configuration_error(
                &format!("workflow '{}'", self.graph.name),
                &violations,
            ));
        }
        Ok(self.graph)
    }
}

fn configuration_error(subject: &str, violations: &[Violation]) -> DeployError {
    let details: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    DeployError::Configuration(format!("{}: {}", subject, details.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::validate;
    use serde_json::json;

    #[test]
    fn test_build_crew() {
        let crew = CrewBuilder::new("crew")
            .description("desc")
            .agent(Agent::new("A", "r", "g", "b"))
            .task(Task::new("t1", "o", "A").named("first"))
            .task(Task::new("t2", "o", "A").with_context(["first"]))
            .max_rpm(5)
            .embedder(Embedder::new("openai", "text-embedding-3-small"))
            .build()
            .unwrap();
        assert_eq!(crew.tasks.len(), 2);
        assert_eq!(crew.max_rpm, 5);
        assert!(crew.memory && crew.cache);
    }

    #[test]
    fn test_dangling_agent_is_configuration_error() {
        let err = CrewBuilder::new("crew")
            .agent(Agent::new("A", "r", "g", "b"))
            .task(Task::new("t1", "o", "Nobody"))
            .build()
            .unwrap_err();
        match err {
            DeployError::Configuration(msg) => assert!(msg.contains("Nobody")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_context_is_configuration_error() {
        let err = CrewBuilder::new("crew")
            .agent(Agent::new("A", "r", "g", "b"))
            .task(Task::new("t1", "o", "A").with_context(["t2"]))
            .task(Task::new("t2", "o", "A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, DeployError::Configuration(_)));
    }

    #[test]
    fn test_build_workflow_with_chain() {
        let graph = WorkflowBuilder::new("wf")
            .node(Node::input("input", json!({})))
            .node(Node::agent("analyze", "A", "t"))
            .node(Node::output("output", "json", json!({})))
            .chain(["input", "analyze", "output"])
            .build()
            .unwrap();
        assert_eq!(graph.edges.len(), 2);
        assert!(validate(&graph).is_valid());
    }

    #[test]
    fn test_edge_to_missing_node_is_configuration_error() {
        let err = WorkflowBuilder::new("wf")
            .node(Node::input("input", json!({})))
            .edge("input", "nowhere")
            .build()
            .unwrap_err();
        match err {
            DeployError::Configuration(msg) => assert!(msg.contains("nowhere")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
