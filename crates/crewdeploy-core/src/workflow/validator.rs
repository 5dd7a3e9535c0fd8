//! Workflow graph validation.
//!
//! A deployable graph is a single simple path:
//!
//! ```text
//! input ──► agent ──► agent ──► ... ──► output
//! ```
//!
//! `validate` runs every check and returns all violations at once. It has
//! no side effects, so validating the same graph twice yields the same
//! report.

use std::collections::{HashMap, HashSet, VecDeque};

use super::graph::{NodeType, WorkflowGraph};
use crate::models::Crew;
use crate::validation::{ValidationReport, Violation};

/// Validate the structural invariants of a workflow graph.
///
/// Checks for:
/// - Unique node ids
/// - Edge endpoints that exist
/// - Exactly one input and one output node
/// - No edges into the input or out of the output
/// - No branching or merging
/// - A walk from the input that visits every node once and ends at the output
/// - No cycles, on or off the path
pub fn validate(graph: &WorkflowGraph) -> ValidationReport {
    let mut violations = Vec::new();

    // Node ids, first declaration wins
    let mut types: HashMap<&str, NodeType> = HashMap::new();
    for node in &graph.nodes {
        if types.contains_key(node.id.as_str()) {
            violations.push(Violation::DuplicateNode {
                id: node.id.clone(),
            });
        } else {
            types.insert(node.id.as_str(), node.node_type());
        }
    }

    // Edges whose endpoints both exist; dangling ones are reported and ignored
    let mut edges: Vec<(&str, &str)> = Vec::new();
    for edge in &graph.edges {
        let mut dangling = false;
        for endpoint in [&edge.from, &edge.to] {
            if !types.contains_key(endpoint.as_str()) {
                violations.push(Violation::DanglingEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    missing: endpoint.clone(),
                });
                dangling = true;
            }
        }
        if !dangling {
            edges.push((edge.from.as_str(), edge.to.as_str()));
        }
    }

    let inputs = graph.ids_of_type(NodeType::Input);
    let outputs = graph.ids_of_type(NodeType::Output);
    match inputs.len() {
        0 => violations.push(Violation::MissingInput),
        1 => {}
        _ => violations.push(Violation::MultipleInputs {
            ids: inputs.iter().map(|s| s.to_string()).collect(),
        }),
    }
    match outputs.len() {
        0 => violations.push(Violation::MissingOutput),
        1 => {}
        _ => violations.push(Violation::MultipleOutputs {
            ids: outputs.iter().map(|s| s.to_string()).collect(),
        }),
    }

    // Degree rules
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    for (from, to) in &edges {
        *out_degree.entry(from).or_default() += 1;
        *in_degree.entry(to).or_default() += 1;
    }
    let mut seen = HashSet::new();
    for node in &graph.nodes {
        let id = node.id.as_str();
        if !seen.insert(id) {
            continue;
        }
        let incoming = in_degree.get(id).copied().unwrap_or(0);
        let outgoing = out_degree.get(id).copied().unwrap_or(0);
        match node.node_type() {
            NodeType::Input if incoming > 0 => {
                violations.push(Violation::InputHasIncoming { id: id.to_string() })
            }
            NodeType::Output if outgoing > 0 => {
                violations.push(Violation::OutputHasOutgoing { id: id.to_string() })
            }
            _ => {}
        }
        if incoming > 1 {
            violations.push(Violation::Merge {
                id: id.to_string(),
                incoming,
            });
        }
        if outgoing > 1 && node.node_type() != NodeType::Output {
            violations.push(Violation::Branch {
                id: id.to_string(),
                outgoing,
            });
        }
    }

    // Walk the path from the sole input
    let mut walk_found_cycle = false;
    if let [input] = inputs.as_slice() {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = *input;
        loop {
            if !visited.insert(current) {
                violations.push(Violation::Cycle {
                    id: current.to_string(),
                });
                walk_found_cycle = true;
                break;
            }
            match edges.iter().find(|(from, _)| *from == current) {
                Some((_, next)) => current = *next,
                None => {
                    if types.get(current) != Some(&NodeType::Output) {
                        violations.push(Violation::PathEndsEarly {
                            id: current.to_string(),
                        });
                    }
                    break;
                }
            }
        }

        let mut unreachable = Vec::new();
        let mut listed = HashSet::new();
        for node in &graph.nodes {
            let id = node.id.as_str();
            if !visited.contains(id) && listed.insert(id) {
                unreachable.push(id.to_string());
            }
        }
        if !unreachable.is_empty() {
            violations.push(Violation::Unreachable { ids: unreachable });
        }
    }

    // Cycles the walk could not see
    if !walk_found_cycle {
        if let Some(id) = first_cyclic_node(graph, &edges) {
            violations.push(Violation::Cycle { id: id.to_string() });
        }
    }

    ValidationReport::new(violations)
}

/// Check that every agent node is bound to an agent the crew defines.
pub fn validate_bindings(graph: &WorkflowGraph, crew: &Crew) -> ValidationReport {
    let violations = graph
        .nodes
        .iter()
        .filter_map(|node| {
            let agent = node.agent_name()?;
            if crew.agent(agent).is_some() {
                None
            } else {
                Some(Violation::UnknownAgentBinding {
                    node: node.id.clone(),
                    agent: agent.to_string(),
                })
            }
        })
        .collect();
    ValidationReport::new(violations)
}

/// Kahn's algorithm: any node left with unresolved in-degree sits on or
/// behind a cycle. Returns the first such node in declaration order.
fn first_cyclic_node<'a>(graph: &'a WorkflowGraph, edges: &[(&'a str, &'a str)]) -> Option<&'a str> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in &graph.nodes {
        in_degree.entry(node.id.as_str()).or_insert(0);
    }
    for (_, to) in edges {
        *in_degree.entry(to).or_default() += 1;
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut resolved: HashSet<&str> = HashSet::new();
    while let Some(id) = queue.pop_front() {
        resolved.insert(id);
        for (_, to) in edges.iter().filter(|(from, _)| *from == id) {
            if let Some(d) = in_degree.get_mut(to) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(to);
                }
            }
        }
    }

    graph
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .find(|id| !resolved.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, ProcessMode, Task};
    use crate::workflow::graph::{Edge, Node};
    use serde_json::json;

    fn graph(nodes: Vec<Node>, edges: &[(&str, &str)]) -> WorkflowGraph {
        WorkflowGraph {
            name: "wf".into(),
            description: String::new(),
            nodes,
            edges: edges.iter().map(|(f, t)| Edge::new(*f, *t)).collect(),
        }
    }

    fn chain() -> WorkflowGraph {
        graph(
            vec![
                Node::input("input", json!({})),
                Node::agent("analyze", "Memory Analyzer", "Analyze"),
                Node::output("output", "json", json!({})),
            ],
            &[("input", "analyze"), ("analyze", "output")],
        )
    }

    #[test]
    fn test_simple_chain_is_valid() {
        let report = validate(&chain());
        assert!(report.is_valid(), "unexpected violations: {:?}", report);
    }

    #[test]
    fn test_back_edge_from_output_is_reported() {
        let mut g = chain();
        g.edges.push(Edge::new("output", "analyze"));
        let report = validate(&g);
        assert!(!report.is_valid());
        assert!(report.contains(&Violation::OutputHasOutgoing { id: "output".into() }));
        assert!(report.contains(&Violation::Cycle { id: "analyze".into() }));
        assert!(report.contains(&Violation::Merge {
            id: "analyze".into(),
            incoming: 2
        }));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut g = chain();
        g.edges.push(Edge::new("output", "analyze"));
        assert_eq!(validate(&g), validate(&g));
    }

    #[test]
    fn test_two_outputs_reported() {
        let g = graph(
            vec![
                Node::input("input", json!({})),
                Node::agent("analyze", "A", "t"),
                Node::output("out_a", "json", json!({})),
                Node::output("out_b", "json", json!({})),
            ],
            &[("input", "analyze"), ("analyze", "out_a"), ("analyze", "out_b")],
        );
        let report = validate(&g);
        assert!(report.contains(&Violation::MultipleOutputs {
            ids: vec!["out_a".into(), "out_b".into()]
        }));
        assert!(report.contains(&Violation::Branch {
            id: "analyze".into(),
            outgoing: 2
        }));
        assert!(report.contains(&Violation::Unreachable {
            ids: vec!["out_b".into()]
        }));
    }

    #[test]
    fn test_missing_terminals() {
        let g = graph(vec![Node::agent("a", "A", "t")], &[]);
        let report = validate(&g);
        assert!(report.contains(&Violation::MissingInput));
        assert!(report.contains(&Violation::MissingOutput));
    }

    #[test]
    fn test_dangling_edge_reported() {
        let mut g = chain();
        g.edges.push(Edge::new("analyze", "ghost"));
        let report = validate(&g);
        assert!(report.contains(&Violation::DanglingEdge {
            from: "analyze".into(),
            to: "ghost".into(),
            missing: "ghost".into()
        }));
    }

    #[test]
    fn test_path_that_stops_short() {
        let g = graph(
            vec![
                Node::input("input", json!({})),
                Node::agent("a", "A", "t"),
                Node::output("output", "json", json!({})),
            ],
            &[("input", "a")],
        );
        let report = validate(&g);
        assert!(report.contains(&Violation::PathEndsEarly { id: "a".into() }));
        assert!(report.contains(&Violation::Unreachable {
            ids: vec!["output".into()]
        }));
    }

    #[test]
    fn test_detached_cycle_reported() {
        let mut g = chain();
        g.nodes.push(Node::agent("x", "A", "t"));
        g.nodes.push(Node::agent("y", "A", "t"));
        g.edges.push(Edge::new("x", "y"));
        g.edges.push(Edge::new("y", "x"));
        let report = validate(&g);
        assert!(report.contains(&Violation::Unreachable {
            ids: vec!["x".into(), "y".into()]
        }));
        assert!(report.contains(&Violation::Cycle { id: "x".into() }));
    }

    #[test]
    fn test_duplicate_node_ids() {
        let mut g = chain();
        g.nodes.push(Node::agent("analyze", "A", "t"));
        let report = validate(&g);
        assert!(report.contains(&Violation::DuplicateNode { id: "analyze".into() }));
    }

    #[test]
    fn test_bindings_against_crew() {
        let crew = Crew {
            name: "c".into(),
            description: String::new(),
            agents: vec![Agent::new("Memory Analyzer", "r", "g", "b")],
            tasks: vec![Task::new("d", "o", "Memory Analyzer")],
            process: ProcessMode::Sequential,
            memory: true,
            cache: true,
            max_rpm: 10,
            embedder: None,
        };
        assert!(validate_bindings(&chain(), &crew).is_valid());

        let mut g = chain();
        g.nodes[1] = Node::agent("analyze", "Story Weaver", "t");
        let report = validate_bindings(&g, &crew);
        assert_eq!(
            report.violations,
            vec![Violation::UnknownAgentBinding {
                node: "analyze".into(),
                agent: "Story Weaver".into()
            }]
        );
    }
}
