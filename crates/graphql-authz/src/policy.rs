use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("{0}")]
    Evaluation(String),
}

/// Answers whether `subject` may perform `action` on `object`.
///
/// Implementations must be pure with respect to their rule set: the same
/// request always gets the same answer while the rules are unchanged.
#[async_trait::async_trait]
pub trait Enforcer: Send + Sync + 'static {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool, PolicyError>;
}

#[async_trait::async_trait]
impl<E: Enforcer + ?Sized> Enforcer for Arc<E> {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool, PolicyError> {
        E::enforce(self, subject, object, action).await
    }
}

#[async_trait::async_trait]
impl<E: Enforcer + ?Sized> Enforcer for Box<E> {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool, PolicyError> {
        E::enforce(self, subject, object, action).await
    }
}

/// Rules can be reloaded while requests are in flight.
#[async_trait::async_trait]
impl<E: Enforcer> Enforcer for tokio::sync::RwLock<E> {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool, PolicyError> {
        self.read().await.enforce(subject, object, action).await
    }
}

#[cfg(feature = "casbin")]
#[async_trait::async_trait]
impl Enforcer for casbin::Enforcer {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool, PolicyError> {
        casbin::CoreApi::enforce(self, (subject, object, action)).map_err(|err| PolicyError::Evaluation(err.to_string()))
    }
}
