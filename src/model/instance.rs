use crate::model::{Cardinality, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default timestamp for records created without audit information
fn default_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap_or_else(Utc::now)
}

/// A persisted domain object.
///
/// Plain values live in `attributes`; links to other objects live in
/// `references`, keyed by property name. A property with no entry in
/// `references` is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: Id,
    #[serde(rename = "class")]
    pub class_id: Id,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub references: HashMap<String, ReferenceValue>,

    /// Audit timestamps
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Instance {
    pub fn new(class_id: impl Into<Id>, id: impl Into<Id>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            class_id: class_id.into(),
            attributes: serde_json::Map::new(),
            references: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: serde_json::Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn with_reference(mut self, name: &str, value: ReferenceValue) -> Self {
        self.references.insert(name.to_string(), value);
        self
    }

    /// Stamp the update time before a save.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// The stored value of a reference property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceValue {
    Single(Id),
    Collection(Vec<Id>),
    Map(BTreeMap<String, Id>),
}

impl ReferenceValue {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            ReferenceValue::Single(_) => Cardinality::Single,
            ReferenceValue::Collection(_) => Cardinality::Collection,
            ReferenceValue::Map(_) => Cardinality::Map,
        }
    }

    /// Every referenced id, in iteration order.
    pub fn ids(&self) -> Vec<&Id> {
        match self {
            ReferenceValue::Single(id) => vec![id],
            ReferenceValue::Collection(ids) => ids.iter().collect(),
            ReferenceValue::Map(entries) => entries.values().collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids().into_iter().any(|candidate| candidate == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_value_deserializes_by_shape() {
        let single: ReferenceValue = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(single, ReferenceValue::Single("7".to_string()));

        let collection: ReferenceValue = serde_json::from_value(json!(["7", "9"])).unwrap();
        assert_eq!(collection.cardinality(), Cardinality::Collection);

        let map: ReferenceValue = serde_json::from_value(json!({"main": "7"})).unwrap();
        assert_eq!(map.cardinality(), Cardinality::Map);
        assert!(map.contains("7"));
        assert!(!map.contains("main"));
    }

    #[test]
    fn test_instance_without_timestamps() {
        let instance: Instance = serde_json::from_value(json!({
            "id": "5",
            "class": "Order",
            "references": {"items": ["1", "2"]}
        }))
        .unwrap();

        assert_eq!(instance.created_at.timestamp(), 0);
        assert!(instance.attributes.is_empty());
        assert_eq!(
            instance.references.get("items"),
            Some(&ReferenceValue::Collection(vec!["1".to_string(), "2".to_string()]))
        );
    }
}
