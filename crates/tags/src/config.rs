use serde::{Deserialize, Serialize};

/// Adjustments to the static builtin tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Names always kept, even when a table would drop them
    pub allow: Vec<String>,

    /// Names always dropped
    pub deny: Vec<String>,
}

impl TagConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.allow.iter().find(|name| self.deny.contains(name)) {
            return Err(format!("{name:?} is both allowed and denied"));
        }
        if self
            .allow
            .iter()
            .chain(self.deny.iter())
            .any(|name| name.trim().is_empty())
        {
            return Err("allow/deny names must not be empty".to_string());
        }
        Ok(())
    }
}
