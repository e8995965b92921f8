use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{Id, Instance};
use crate::store::traits::EntityStore;

/// In-process store used when no database is configured, and by tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(Id, Id), Instance>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryStore {
    async fn find_one(&self, class_id: &Id, id: &Id) -> Result<Option<Instance>> {
        let entries = self.entries.read();
        Ok(entries.get(&(class_id.clone(), id.clone())).cloned())
    }

    async fn save(&self, instance: Instance) -> Result<Instance> {
        let mut entries = self.entries.write();
        let key = (instance.class_id.clone(), instance.id.clone());
        entries.insert(key, instance.clone());
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReferenceValue;

    #[tokio::test]
    async fn test_memory_store_basic_operations() {
        let store = MemoryStore::new();

        let order = Instance::new("Order", "5")
            .with_reference("items", ReferenceValue::Collection(vec!["1".to_string()]));
        store.save(order.clone()).await.unwrap();
        store.save(Instance::new("Item", "1")).await.unwrap();

        let found = store
            .find_one(&"Order".to_string(), &"5".to_string())
            .await
            .unwrap();
        assert_eq!(found, Some(order));

        // Same id under another class is a different object
        let missing = store
            .find_one(&"Item".to_string(), &"5".to_string())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_instance() {
        let store = MemoryStore::new();
        store.save(Instance::new("Item", "1")).await.unwrap();
        let renamed = Instance::new("Item", "1").with_attribute("name", serde_json::json!("Bell"));
        store.save(renamed.clone()).await.unwrap();

        let found = store
            .find_one(&"Item".to_string(), &"1".to_string())
            .await
            .unwrap();
        assert_eq!(found, Some(renamed));
    }
}
