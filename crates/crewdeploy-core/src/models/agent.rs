use serde::{Deserialize, Serialize};

/// A named role description submitted as part of a crew.
///
/// Agents are purely descriptive: nothing here executes. Tasks refer to
/// an agent by its `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Capability tags, in declaration order, without duplicates.
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub allow_delegation: bool,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            allow_delegation: false,
        }
    }

    /// Add capability tags. Tags already present are ignored so the list
    /// stays an ordered set.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tool in tools {
            let tool = tool.into();
            if !self.tools.contains(&tool) {
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn with_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }
}
