use crate::model::{ClassDef, Instance, PropertyDef, ReferenceValue, RepositoryMapping, Schema};
use crate::store::traits::Store;
use anyhow::Result;
use serde_json::json;
use std::collections::BTreeMap;

/// Built-in schema used when no schema file is configured
pub fn demo_schema() -> Schema {
    Schema {
        id: "demo".to_string(),
        description: Some("Orders, items and customers".to_string()),
        classes: vec![
            ClassDef::new("Order", RepositoryMapping::new("orders"))
                .with_property(PropertyDef::collection("items", "Item"))
                .with_property(PropertyDef::single("customer", "Customer")),
            ClassDef::new("Item", RepositoryMapping::new("items"))
                .with_property(
                    PropertyDef::single("warehouse", "Warehouse")
                        .with_path("stocked-at")
                        .with_rel("stockedAt"),
                ),
            ClassDef::new("Customer", RepositoryMapping::new("customers"))
                .with_property(PropertyDef::map("favorites", "Item")),
            ClassDef::new("Warehouse", RepositoryMapping::new("warehouses")),
        ],
    }
}

fn item(id: &str, name: &str, price: i64) -> Instance {
    Instance::new("Item", id)
        .with_attribute("name", json!(name))
        .with_attribute("price", json!(price))
}

/// Instances matching `demo_schema`
pub fn demo_instances() -> Vec<Instance> {
    let mut favorites = BTreeMap::new();
    favorites.insert("primary".to_string(), "1".to_string());

    vec![
        Instance::new("Warehouse", "north").with_attribute("city", json!("Umeå")),
        item("1", "Frame", 400)
            .with_reference("warehouse", ReferenceValue::Single("north".to_string())),
        item("2", "Wheel", 80),
        item("7", "Saddle", 35),
        item("9", "Bell", 5),
        Instance::new("Customer", "1")
            .with_attribute("name", json!("Ada"))
            .with_reference("favorites", ReferenceValue::Map(favorites)),
        Instance::new("Order", "5")
            .with_attribute("status", json!("open"))
            .with_reference(
                "items",
                ReferenceValue::Collection(vec!["1".to_string(), "2".to_string()]),
            )
            .with_reference("customer", ReferenceValue::Single("1".to_string())),
        Instance::new("Order", "6").with_attribute("status", json!("draft")),
    ]
}

pub async fn load_seed_data<S: Store + ?Sized>(store: &S) -> Result<()> {
    for instance in demo_instances() {
        log::debug!("Seeding {} '{}'", instance.class_id, instance.id);
        store.save(instance).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_schema_is_valid() {
        demo_schema().validate().unwrap();
    }

    #[test]
    fn test_demo_instances_match_schema() {
        let schema = demo_schema();
        for instance in demo_instances() {
            let class = schema
                .get_class(&instance.class_id)
                .unwrap_or_else(|| panic!("unknown class {}", instance.class_id));
            for property in &class.properties {
                property.read(&instance).unwrap();
            }
            for name in instance.references.keys() {
                assert!(
                    class.properties.iter().any(|p| &p.name == name),
                    "{} has undeclared reference {}",
                    class.id,
                    name
                );
            }
        }
    }
}
