use crate::model::{Id, Instance};
use anyhow::Result;

/// Persistence for domain objects, keyed by class and id
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Get an instance by class and id
    async fn find_one(&self, class_id: &Id, id: &Id) -> Result<Option<Instance>>;
    /// Insert or replace an instance, returning what was stored
    async fn save(&self, instance: Instance) -> Result<Instance>;
}

pub trait Store: EntityStore + Send + Sync {}
impl<T: EntityStore + Send + Sync> Store for T {}
