use std::{path::Path, str::FromStr};

use crate::principal::DEFAULT_ANONYMOUS_SUBJECT;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read the authorization configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid authorization configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings of the field authorization extension.
///
/// ```toml
/// action = "read"
/// anonymous_subject = "anonymous"
/// skip_introspection = false
/// cache_decisions = true
///
/// [resource_path]
/// include_root_type = false
/// case = "preserve"
/// ```
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Action sent to the policy for every field.
    pub action: String,
    /// Subject sent to the policy when the request has no principal.
    pub anonymous_subject: String,
    /// Resolve introspection fields (`__schema`, `__type` and their subtrees) without asking the policy.
    pub skip_introspection: bool,
    /// Remember decisions for the duration of a request.
    pub cache_decisions: bool,
    pub resource_path: ResourcePathConfig,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            action: "read".to_owned(),
            anonymous_subject: DEFAULT_ANONYMOUS_SUBJECT.to_owned(),
            skip_introspection: false,
            cache_decisions: true,
            resource_path: ResourcePathConfig::default(),
        }
    }
}

impl AuthorizationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }
}

impl FromStr for AuthorizationConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcePathConfig {
    /// Start root field paths with the root type name, `Query.project` instead of `project`.
    pub include_root_type: bool,
    pub case: PathCase,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCase {
    #[default]
    Preserve,
    Lower,
}
