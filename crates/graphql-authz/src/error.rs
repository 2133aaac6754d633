use async_graphql::{PathSegment, Pos, ServerError};

use crate::{policy::PolicyError, resource::ResourcePath};

/// A field the principal was not allowed to read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{subject} can not query {resource}")]
pub struct FieldAuthorizationError {
    pub subject: String,
    pub resource: ResourcePath,
    /// Response path, with aliases and list indices.
    pub path: Vec<PathSegment>,
    pub location: Option<Pos>,
}

impl From<FieldAuthorizationError> for ServerError {
    fn from(error: FieldAuthorizationError) -> Self {
        let mut server_error = ServerError::new(error.to_string(), error.location);
        server_error.path = error.path;
        server_error
    }
}

pub(crate) fn policy_failure(error: &PolicyError, location: Option<Pos>) -> ServerError {
    ServerError::new(format!("authorization policy failed: {error}"), location)
}
