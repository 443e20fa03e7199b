//! Workflow execution context

use serde_json::{Map, Value};

use super::variables;

/// Context key holding the run's input parameters
pub const INPUT_KEY: &str = "input";

/// Per-run mapping of node id to output, seeded with the input parameters
/// under [`INPUT_KEY`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    entries: Map<String, Value>,
}

impl ExecutionContext {
    pub fn new(input: Value) -> Self {
        let mut entries = Map::new();
        entries.insert(INPUT_KEY.to_string(), input);
        Self { entries }
    }

    /// The run's input parameters
    pub fn input(&self) -> &Value {
        self.entries.get(INPUT_KEY).unwrap_or(&Value::Null)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Record a node's output; a later write under the same id replaces it
    pub fn set_output(&mut self, node_id: impl Into<String>, output: Value) {
        self.entries.insert(node_id.into(), output);
    }

    /// Every entry except the input parameters
    pub fn node_outputs(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() != INPUT_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Substitute `{...}` references in a string
    pub fn resolve(&self, text: &str) -> String {
        variables::resolve(text, self)
    }

    /// Substitute `{...}` references in every string leaf of a value
    pub fn resolve_value(&self, value: &Value) -> Value {
        variables::resolve_value(value, self)
    }
}
