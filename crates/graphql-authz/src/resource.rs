use std::fmt;

use crate::config::{PathCase, ResourcePathConfig};

/// Static position of a field in the schema, `project.members.tickets.message`.
///
/// Unlike the response path it holds neither aliases nor list indices, so every
/// occurrence of a field at a given schema position shares the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Resource of `field`, given the resource of the field it was selected on.
    ///
    /// `parent_type` is only used for root fields.
    pub fn derive(
        parent: Option<&ResourcePath>,
        parent_type: &str,
        field: &str,
        config: &ResourcePathConfig,
    ) -> Self {
        let field = config.case.apply(field);
        match parent {
            Some(parent) => Self(format!("{}.{field}", parent.0)),
            None if config.include_root_type => Self(format!("{}.{field}", config.case.apply(parent_type))),
            None => Self(field),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PathCase {
    fn apply(self, segment: &str) -> String {
        match self {
            PathCase::Preserve => segment.to_owned(),
            PathCase::Lower => segment.to_lowercase(),
        }
    }
}
