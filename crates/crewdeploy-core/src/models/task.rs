use serde::{Deserialize, Serialize};

/// One step of a crew's sequential process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Short handle other tasks use in their `context`. When absent the
    /// task is referenced by its description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub description: String,

    pub expected_output: String,

    /// Name of the owning agent.
    pub agent: String,

    /// Earlier tasks whose output this task consumes, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.into(),
            context: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.extend(context.into_iter().map(Into::into));
        self
    }

    /// The string other tasks use to reference this one.
    pub fn key(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_name() {
        let task = Task::new("Analyze memory", "metadata", "Memory Analyzer");
        assert_eq!(task.key(), "Analyze memory");
        let task = task.named("analyze_memory");
        assert_eq!(task.key(), "analyze_memory");
    }

    #[test]
    fn test_empty_context_is_omitted_on_the_wire() {
        let task = Task::new("d", "o", "a");
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("context").is_none());
        assert!(json.get("name").is_none());
        assert_eq!(json["expected_output"], "o");

        let task = task.with_context(["first"]);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["context"], serde_json::json!(["first"]));
    }
}
