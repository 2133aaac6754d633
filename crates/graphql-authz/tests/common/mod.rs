#![allow(dead_code, clippy::panic)]

mod schema;

use std::sync::{Arc, Mutex};

use async_graphql::{EmptyMutation, EmptySubscription};
use graphql_authz::{AuthorizationConfig, Enforcer, FieldAuthorization, PolicyError, Principal};

pub use schema::{ProjectEventSchema, ProjectEvents, ProjectSchema, Query, ResolverCalls};

#[ctor::ctor]
fn setup_logging() {
    let filter = tracing_subscriber::filter::EnvFilter::builder()
        .parse(std::env::var("RUST_LOG").unwrap_or("graphql_authz=debug".to_string()))
        .unwrap();
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .without_time()
        .init();
}

pub fn schema(enforcer: impl Enforcer) -> ProjectSchema {
    schema_with_config(enforcer, AuthorizationConfig::default())
}

pub fn schema_with_config(enforcer: impl Enforcer, config: AuthorizationConfig) -> ProjectSchema {
    async_graphql::Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(FieldAuthorization::with_config(enforcer, config))
        .finish()
}

pub fn event_schema(enforcer: impl Enforcer) -> ProjectEventSchema {
    async_graphql::Schema::build(Query, EmptyMutation, ProjectEvents)
        .extension(FieldAuthorization::new(enforcer))
        .finish()
}

pub async fn execute(schema: &ProjectSchema, query: &str, principal: Option<Principal>) -> serde_json::Value {
    let mut request = async_graphql::Request::new(query);
    if let Some(principal) = principal {
        request = request.data(principal);
    }
    serde_json::to_value(schema.execute(request).await).unwrap()
}

/// In-memory policy: exact objects or `prefix.*` patterns, deny rules win, anything else is denied.
#[derive(Clone, Default)]
pub struct RulePolicy {
    rules: Vec<Rule>,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
}

#[derive(Clone)]
struct Rule {
    subject: String,
    object: String,
    allow: bool,
}

impl RulePolicy {
    /// The rules of `tests/fixtures/policy.csv` and `policy_with_project_id_restricted.csv`.
    pub fn reference() -> Self {
        Self::default()
            .allow("anonymous", "project")
            .allow("anonymous", "project.id")
            .allow("user", "project")
            .allow("user", "project.id")
            .allow("user", "project.members")
            .allow("user", "project.members.*")
            .deny("user", "project.members.tickets.message")
            .allow("unauthorized_user", "project")
            .allow("unauthorized_user", "project.name")
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            failure: Some(cause.to_owned()),
            ..Default::default()
        }
    }

    pub fn allow(self, subject: &str, object: &str) -> Self {
        self.rule(subject, object, true)
    }

    pub fn deny(self, subject: &str, object: &str) -> Self {
        self.rule(subject, object, false)
    }

    fn rule(mut self, subject: &str, object: &str, allow: bool) -> Self {
        self.rules.push(Rule {
            subject: subject.to_owned(),
            object: object.to_owned(),
            allow,
        });
        self
    }

    /// Every `(subject, object, action)` the policy was asked about, in order.
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn matching<'a>(&'a self, subject: &'a str, object: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| {
            rule.subject == subject
                && match rule.object.strip_suffix('*') {
                    Some(prefix) => object.starts_with(prefix),
                    None => rule.object == object,
                }
        })
    }
}

#[async_trait::async_trait]
impl Enforcer for RulePolicy {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool, PolicyError> {
        self.requests
            .lock()
            .unwrap()
            .push((subject.to_owned(), object.to_owned(), action.to_owned()));

        if let Some(cause) = &self.failure {
            return Err(PolicyError::Evaluation(cause.clone()));
        }

        let mut allowed = false;
        for rule in self.matching(subject, object) {
            if !rule.allow {
                return Ok(false);
            }
            allowed = true;
        }
        Ok(allowed)
    }
}
