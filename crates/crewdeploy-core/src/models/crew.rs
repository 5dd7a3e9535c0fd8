//! Crew aggregate: agents, tasks and process settings.
//!
//! The wire shape matches what the crew service accepts:
//!
//! ```json
//! {
//!   "name": "the-big-family-legacy-crew",
//!   "description": "...",
//!   "agents": [ { "name": "Memory Analyzer", "role": "...", ... } ],
//!   "tasks": [ { "description": "...", "expected_output": "...", "agent": "Memory Analyzer" } ],
//!   "process": "sequential",
//!   "memory": true,
//!   "cache": true,
//!   "max_rpm": 10,
//!   "embedder": { "provider": "openai", "config": { "model": "text-embedding-3-small" } }
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Agent, Task};
use crate::error::Result;
use crate::validation::{ValidationReport, Violation};

/// How the crew runs its tasks. Only the sequential chain is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessMode {
    #[default]
    Sequential,
}

impl std::fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Embedding provider used for crew memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embedder {
    pub provider: String,
    pub config: EmbedderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
}

impl Embedder {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            config: EmbedderConfig {
                model: model.into(),
                dimensions: None,
            },
        }
    }

    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.config.dimensions = Some(dimensions);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Unique by name; order is preserved on the wire.
    pub agents: Vec<Agent>,

    /// Execution order is definition order.
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub process: ProcessMode,

    #[serde(default = "default_true")]
    pub memory: bool,

    #[serde(default = "default_true")]
    pub cache: bool,

    /// Maximum requests per minute.
    #[serde(default = "default_max_rpm")]
    pub max_rpm: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedder: Option<Embedder>,
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_max_rpm() -> u32 {
    10
}

impl Crew {
    /// Look up an agent by name.
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Check every crew invariant and collect all violations.
    ///
    /// `CrewBuilder::build` refuses to produce a crew with violations, but a
    /// crew read from a file has not been through the builder.
    pub fn violations(&self) -> ValidationReport {
        let mut violations = Vec::new();

        if self.agents.is_empty() {
            violations.push(Violation::NoAgents);
        }
        if self.tasks.is_empty() {
            violations.push(Violation::NoTasks);
        }
        if self.max_rpm == 0 {
            violations.push(Violation::ZeroRateLimit);
        }

        let mut names = HashSet::new();
        for agent in &self.agents {
            if !names.insert(agent.name.as_str()) {
                violations.push(Violation::DuplicateAgent {
                    name: agent.name.clone(),
                });
            }
        }

        let mut earlier: HashSet<&str> = HashSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            if !names.contains(task.agent.as_str()) {
                violations.push(Violation::UnknownTaskAgent {
                    task: index,
                    agent: task.agent.clone(),
                });
            }
            for reference in &task.context {
                if !earlier.contains(reference.as_str()) {
                    violations.push(Violation::InvalidContext {
                        task: index,
                        reference: reference.clone(),
                    });
                }
            }
            earlier.insert(task.key());
        }

        ValidationReport::new(violations)
    }

    /// Load a crew from a JSON or YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        crate::document::from_path(path)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crew(agents: Vec<Agent>, tasks: Vec<Task>) -> Crew {
        Crew {
            name: "test-crew".into(),
            description: String::new(),
            agents,
            tasks,
            process: ProcessMode::Sequential,
            memory: true,
            cache: true,
            max_rpm: 10,
            embedder: None,
        }
    }

    #[test]
    fn test_valid_crew_has_no_violations() {
        let c = crew(
            vec![Agent::new("A", "r", "g", "b"), Agent::new("B", "r", "g", "b")],
            vec![
                Task::new("first", "o", "A").named("one"),
                Task::new("second", "o", "B").with_context(["one"]),
            ],
        );
        assert!(c.violations().is_valid());
    }

    #[test]
    fn test_collects_all_crew_violations() {
        let mut c = crew(
            vec![Agent::new("A", "r", "g", "b"), Agent::new("A", "r", "g", "b")],
            vec![
                Task::new("first", "o", "Ghost").with_context(["later"]),
                Task::new("later", "o", "A"),
            ],
        );
        c.max_rpm = 0;

        let report = c.violations();
        assert!(report.contains(&Violation::ZeroRateLimit));
        assert!(report.contains(&Violation::DuplicateAgent { name: "A".into() }));
        assert!(report.contains(&Violation::UnknownTaskAgent {
            task: 0,
            agent: "Ghost".into()
        }));
        assert!(report.contains(&Violation::InvalidContext {
            task: 0,
            reference: "later".into()
        }));
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn test_context_may_reference_description() {
        let c = crew(
            vec![Agent::new("A", "r", "g", "b")],
            vec![
                Task::new("Analyze memory", "o", "A"),
                Task::new("Write story", "o", "A").with_context(["Analyze memory"]),
            ],
        );
        assert!(c.violations().is_valid());
    }

    #[test]
    fn test_parse_crew_with_defaults() {
        let yaml = r#"
name: "mini"
agents:
  - name: "A"
    role: "r"
    goal: "g"
    backstory: "b"
tasks:
  - description: "d"
    expected_output: "o"
    agent: "A"
"#;
        let c: Crew = crate::document::from_yaml(yaml).unwrap();
        assert_eq!(c.process, ProcessMode::Sequential);
        assert!(c.memory);
        assert!(c.cache);
        assert_eq!(c.max_rpm, 10);
        assert!(c.embedder.is_none());
        assert!(c.violations().is_valid());
    }

    #[test]
    fn test_process_serializes_lowercase() {
        let c = crew(vec![], vec![]);
        let json = c.to_json().unwrap();
        assert_eq!(json["process"], "sequential");
        assert!(json.get("embedder").is_none());
    }
}
