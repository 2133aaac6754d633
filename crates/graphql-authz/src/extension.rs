use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_graphql::{
    extensions::{
        Extension, ExtensionContext, ExtensionFactory, NextExecute, NextParseQuery, NextResolve, ResolveInfo,
    },
    parser::types::ExecutableDocument,
    PathSegment, QueryPathNode, QueryPathSegment, Response, ServerError, ServerResult, Value, Variables,
};

use crate::{
    config::AuthorizationConfig,
    error::{policy_failure, FieldAuthorizationError},
    locate::Operation,
    policy::{Enforcer, PolicyError},
    principal::Principal,
    resource::ResourcePath,
};

tokio::task_local! {
    /// Resource of the field whose resolution is currently running.
    static PARENT_RESOURCE: ResourcePath;
}

/// Field authorization extension
///
/// Every field of an operation is checked against the [`Enforcer`] before it is
/// resolved. Denied fields resolve to `null` with a
/// `"<principal> can not query <resource>"` error, the rest of the response is
/// untouched.
pub struct FieldAuthorization {
    enforcer: Arc<dyn Enforcer>,
    config: Arc<AuthorizationConfig>,
}

impl FieldAuthorization {
    pub fn new(enforcer: impl Enforcer) -> Self {
        Self::with_config(enforcer, AuthorizationConfig::default())
    }

    pub fn with_config(enforcer: impl Enforcer, config: AuthorizationConfig) -> Self {
        Self {
            enforcer: Arc::new(enforcer),
            config: Arc::new(config),
        }
    }
}

impl ExtensionFactory for FieldAuthorization {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(FieldAuthorizationExtension {
            enforcer: self.enforcer.clone(),
            config: self.config.clone(),
            operation: Mutex::default(),
            decisions: Mutex::default(),
            denials: Mutex::default(),
            nulled: Mutex::default(),
            policy_failure: Mutex::default(),
        })
    }
}

/// Per-request state.
struct FieldAuthorizationExtension {
    enforcer: Arc<dyn Enforcer>,
    config: Arc<AuthorizationConfig>,
    operation: Mutex<Option<Operation>>,
    decisions: Mutex<HashMap<ResourcePath, bool>>,
    denials: Mutex<Vec<ServerError>>,
    /// Response paths that must resolve to `null` because a non-null field below them was denied.
    nulled: Mutex<Vec<Vec<PathSegment>>>,
    policy_failure: Mutex<Option<ServerError>>,
}

impl FieldAuthorizationExtension {
    async fn is_allowed(&self, subject: &str, resource: &ResourcePath) -> Result<bool, PolicyError> {
        // The principal is fixed for the whole request, so the resource alone is the key.
        if self.config.cache_decisions {
            let cached = self.decisions.lock().unwrap().get(resource).copied();
            if let Some(allowed) = cached {
                return Ok(allowed);
            }
        }

        let action = self.config.action.as_str();
        let allowed = self.enforcer.enforce(subject, resource.as_str(), action).await?;
        tracing::debug!(subject, %resource, action, allowed, "field authorization decision");

        if self.config.cache_decisions {
            self.decisions.lock().unwrap().insert(resource.clone(), allowed);
        }

        Ok(allowed)
    }

    fn locate(&self, path: &[PathSegment]) -> Option<async_graphql::Pos> {
        self.operation
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|operation| operation.locate(path))
            .and_then(|located| located.position)
    }

    fn null_parent(&self, path: &[PathSegment]) {
        let parent = path[..path.len().saturating_sub(1)].to_vec();
        let mut nulled = self.nulled.lock().unwrap();
        if !nulled.contains(&parent) {
            nulled.push(parent);
        }
    }

    /// Replaces the value of a field or list item with `null` when a non-null field below it was
    /// denied. A non-null position hands the `null` over to its own parent.
    fn propagate_null(
        &self,
        path_node: &QueryPathNode<'_>,
        non_null: bool,
        resolved: ServerResult<Option<Value>>,
    ) -> ServerResult<Option<Value>> {
        if self.nulled.lock().unwrap().is_empty() {
            return resolved;
        }

        let path = response_path(path_node);
        {
            let mut nulled = self.nulled.lock().unwrap();
            let Some(index) = nulled.iter().position(|nulled| *nulled == path) else {
                return resolved;
            };
            nulled.swap_remove(index);
        }

        if let Err(error) = resolved {
            self.denials.lock().unwrap().push(error);
        }
        if non_null {
            self.null_parent(&path);
        }

        Ok(Some(Value::Null))
    }

    /// Puts the errors in the order their fields appear in the operation.
    fn sort_errors(&self, errors: &mut Vec<ServerError>) {
        let operation = self.operation.lock().unwrap();
        let Some(operation) = operation.as_ref() else {
            return;
        };

        let mut keyed = std::mem::take(errors)
            .into_iter()
            .map(|error| {
                let key = operation.locate(&error.path).map(|located| located.key).unwrap_or_default();
                (key, error)
            })
            .collect::<Vec<_>>();
        keyed.sort_by(|(left, _), (right, _)| left.cmp(right));

        errors.extend(keyed.into_iter().map(|(_, error)| error));
    }
}

#[async_trait::async_trait]
impl Extension for FieldAuthorizationExtension {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let document = next.run(ctx, query, variables).await?;
        *self.operation.lock().unwrap() = Some(Operation::new(document.clone()));
        Ok(document)
    }

    async fn execute(
        &self,
        ctx: &ExtensionContext<'_>,
        operation_name: Option<&str>,
        next: NextExecute<'_>,
    ) -> Response {
        {
            let mut operation = self.operation.lock().unwrap();
            if let Some(operation) = operation.as_mut() {
                operation.select(operation_name);
            }
        }

        let mut response = next.run(ctx, operation_name).await;

        if let Some(error) = self.policy_failure.lock().unwrap().take() {
            return Response::from_errors(vec![error]);
        }

        let data_nulled = {
            let mut nulled = self.nulled.lock().unwrap();
            let root = nulled.iter().any(Vec::is_empty);
            nulled.clear();
            root
        };
        if data_nulled {
            response.data = Value::Null;
        }

        let denials = std::mem::take(&mut *self.denials.lock().unwrap());
        if denials.is_empty() && response.errors.len() < 2 {
            return response;
        }

        response.errors.extend(denials);
        self.sort_errors(&mut response.errors);

        response
    }

    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        let path_node = info.path_node;
        let non_null = info.return_type.ends_with('!');

        // List items are not fields, their own fields get checked.
        let is_list_item = matches!(path_node.segment, QueryPathSegment::Index(_));
        let is_introspection = info.is_for_introspection || info.name.starts_with("__");
        if is_list_item || (is_introspection && self.config.skip_introspection) {
            let resolved = next.run(ctx, info).await;
            return self.propagate_null(path_node, non_null, resolved);
        }

        let parent = PARENT_RESOURCE.try_with(Clone::clone).ok();
        let resource = ResourcePath::derive(parent.as_ref(), info.parent_type, info.name, &self.config.resource_path);

        let principal = ctx.data_opt::<Principal>().cloned().unwrap_or_default();
        let subject = principal.subject(&self.config.anonymous_subject);

        match self.is_allowed(subject, &resource).await {
            Ok(true) => {
                let resolved = PARENT_RESOURCE.scope(resource, next.run(ctx, info)).await;
                self.propagate_null(path_node, non_null, resolved)
            }
            Ok(false) => {
                let path = response_path(path_node);
                if non_null {
                    self.null_parent(&path);
                }

                let error = ServerError::from(FieldAuthorizationError {
                    subject: subject.to_owned(),
                    resource,
                    location: self.locate(&path),
                    path,
                });
                tracing::warn!("{}", error.message);
                self.denials.lock().unwrap().push(error);

                Ok(Some(Value::Null))
            }
            Err(err) => {
                tracing::warn!(subject, %resource, "authorization policy failed: {err}");
                let error = policy_failure(&err, self.locate(&response_path(path_node)));
                self.policy_failure.lock().unwrap().get_or_insert_with(|| error.clone());
                Err(error)
            }
        }
    }
}

fn response_path(node: &QueryPathNode<'_>) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let mut current = Some(node);

    while let Some(node) = current {
        path.push(match &node.segment {
            QueryPathSegment::Index(index) => PathSegment::Index(*index),
            QueryPathSegment::Name(name) => PathSegment::Field((*name).to_owned()),
        });
        current = node.parent;
    }

    path.reverse();
    path
}
