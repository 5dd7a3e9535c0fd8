//! Typed single-path pipeline.
//!
//! `Pipeline` cannot express branches, merges or cycles: it is one input,
//! an ordered list of agent stages and one output. `to_graph` renders it as
//! the node/edge form the tracing service expects, and
//! `WorkflowGraph::to_pipeline` goes the other way once a graph validates.

use serde::{Deserialize, Serialize};

use super::graph::{Node, NodeKind, WorkflowGraph};
use super::validator::validate;
use crate::builder::WorkflowBuilder;
use crate::error::{DeployError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputStage {
    pub id: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStage {
    pub id: String,
    pub agent: String,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStage {
    pub id: String,
    pub format: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    pub description: String,
    pub input: InputStage,
    pub stages: Vec<AgentStage>,
    pub output: OutputStage,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input: InputStage,
        output: OutputStage,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input,
            stages: Vec::new(),
            output,
        }
    }

    /// Append an agent stage after the existing ones.
    pub fn then(
        mut self,
        id: impl Into<String>,
        agent: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        self.stages.push(AgentStage {
            id: id.into(),
            agent: agent.into(),
            task: task.into(),
        });
        self
    }

    /// Node ids in path order, input first.
    pub fn ids(&self) -> Vec<&str> {
        std::iter::once(self.input.id.as_str())
            .chain(self.stages.iter().map(|s| s.id.as_str()))
            .chain(std::iter::once(self.output.id.as_str()))
            .collect()
    }

    /// Render as a node/edge graph. Edges connect consecutive stages, so
    /// the result is a single path; a repeated stage id is the only way to
    /// break it and fails with `DeployError::Configuration`.
    pub fn to_graph(&self) -> Result<WorkflowGraph> {
        let builder = WorkflowBuilder::new(self.name.clone())
            .description(self.description.clone())
            .node(Node::input(self.input.id.clone(), self.input.schema.clone()));

        let builder = self.stages.iter().fold(builder, |b, stage| {
            b.node(Node::agent(
                stage.id.clone(),
                stage.agent.clone(),
                stage.task.clone(),
            ))
        });

        builder
            .node(Node::output(
                self.output.id.clone(),
                self.output.format.clone(),
                self.output.schema.clone(),
            ))
            .chain(self.ids())
            .build()
    }
}

impl WorkflowGraph {
    /// Convert a graph into its typed pipeline form.
    ///
    /// Fails with `DeployError::Validation` when the graph is not a single
    /// input-to-output path.
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        validate(self).into_result()?;

        let mut ordered: Vec<&Node> = Vec::with_capacity(self.nodes.len());
        let mut current = self
            .nodes
            .iter()
            .find(|n| matches!(n.kind, NodeKind::Input { .. }));
        while let Some(node) = current {
            ordered.push(node);
            current = self
                .outgoing(&node.id)
                .next()
                .and_then(|edge| self.node(&edge.to));
        }

        let mut input = None;
        let mut output = None;
        let mut stages = Vec::new();
        for node in ordered {
            match &node.kind {
                NodeKind::Input { config } => {
                    input = Some(InputStage {
                        id: node.id.clone(),
                        schema: config.schema.clone(),
                    })
                }
                NodeKind::Agent { agent, config } => stages.push(AgentStage {
                    id: node.id.clone(),
                    agent: agent.clone(),
                    task: config.task.clone(),
                }),
                NodeKind::Output { config } => {
                    output = Some(OutputStage {
                        id: node.id.clone(),
                        format: config.format.clone(),
                        schema: config.schema.clone(),
                    })
                }
            }
        }

        match (input, output) {
            (Some(input), Some(output)) => Ok(Pipeline {
                name: self.name.clone(),
                description: self.description.clone(),
                input,
                stages,
                output,
            }),
            _ => Err(DeployError::Configuration(format!(
                "workflow '{}' has no input-to-output path",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Edge;
    use serde_json::json;

    fn pipeline() -> Pipeline {
        Pipeline::new(
            "wf",
            "test",
            InputStage {
                id: "input".into(),
                schema: json!({"type": "object"}),
            },
            OutputStage {
                id: "output".into(),
                format: "json".into(),
                schema: json!({}),
            },
        )
        .then("analyze", "Memory Analyzer", "Analyze")
        .then("story", "Story Weaver", "Write")
    }

    #[test]
    fn test_pipeline_renders_a_valid_chain() {
        let graph = pipeline().to_graph().unwrap();
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(
            graph.edges,
            vec![
                Edge::new("input", "analyze"),
                Edge::new("analyze", "story"),
                Edge::new("story", "output"),
            ]
        );
        assert!(validate(&graph).is_valid());
    }

    #[test]
    fn test_graph_back_to_pipeline() {
        let original = pipeline();
        let mut graph = original.to_graph().unwrap();
        // declaration order must not matter
        graph.nodes.reverse();
        let back = graph.to_pipeline().unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_invalid_graph_has_no_pipeline() {
        let mut graph = pipeline().to_graph().unwrap();
        graph.edges.pop();
        match graph.to_pipeline() {
            Err(DeployError::Validation(v)) => assert!(!v.is_empty()),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_input_straight_to_output() {
        let p = Pipeline::new(
            "empty",
            "",
            InputStage {
                id: "in".into(),
                schema: json!(null),
            },
            OutputStage {
                id: "out".into(),
                format: "json".into(),
                schema: json!(null),
            },
        );
        let graph = p.to_graph().unwrap();
        assert_eq!(graph.edges, vec![Edge::new("in", "out")]);
        assert!(validate(&graph).is_valid());
    }

    #[test]
    fn test_repeated_stage_id_is_rejected() {
        let reuses_input = pipeline().then("input", "Memory Analyzer", "Again");
        match reuses_input.to_graph() {
            Err(DeployError::Configuration(msg)) => assert!(msg.contains("'input'")),
            other => panic!("expected configuration error, got {:?}", other),
        }

        let twice = pipeline().then("analyze", "Story Weaver", "Again");
        assert!(matches!(
            twice.to_graph(),
            Err(DeployError::Configuration(_))
        ));
    }
}
