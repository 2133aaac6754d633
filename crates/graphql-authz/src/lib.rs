//! Field-level authorization for [async-graphql](async_graphql).
//!
//! Every field resolution is checked against a policy [`Enforcer`] with the
//! request's [`Principal`] as subject, the field's [`ResourcePath`] as object
//! and `read` as action. Denied fields come back as `null` with an error, their
//! siblings are resolved as usual.
//!
//! ```
//! use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
//! use graphql_authz::{enforcer_middleware, Enforcer, PolicyError, Principal};
//!
//! struct Query;
//!
//! #[Object]
//! impl Query {
//!     async fn version(&self) -> &str {
//!         "1.0"
//!     }
//! }
//!
//! struct Admins;
//!
//! #[async_trait::async_trait]
//! impl Enforcer for Admins {
//!     async fn enforce(&self, subject: &str, _object: &str, _action: &str) -> Result<bool, PolicyError> {
//!         Ok(subject == "admin")
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = Schema::build(Query, EmptyMutation, EmptySubscription)
//!     .extension(enforcer_middleware(Admins))
//!     .finish();
//!
//! let request = async_graphql::Request::new("{ version }").data(Principal::from_role(Some("user")));
//! let response = schema.execute(request).await;
//!
//! assert_eq!(response.errors[0].message, "user can not query version");
//! # });
//! ```

mod config;
mod error;
mod extension;
mod locate;
mod policy;
mod principal;
mod resource;

pub use config::{AuthorizationConfig, ConfigError, PathCase, ResourcePathConfig};
pub use error::FieldAuthorizationError;
pub use extension::FieldAuthorization;
pub use policy::{Enforcer, PolicyError};
pub use principal::{Principal, ANONYMOUS_MARKER, DEFAULT_ANONYMOUS_SUBJECT};
pub use resource::ResourcePath;

/// Wraps every field resolution of a schema with a check against `enforcer`.
///
/// Install the returned extension with [`async_graphql::SchemaBuilder::extension`].
pub fn enforcer_middleware(enforcer: impl Enforcer) -> FieldAuthorization {
    FieldAuthorization::new(enforcer)
}
