use crate::logic::error::{ReferenceError, ReferenceResult};
use crate::model::{ClassDef, Instance, PropertyDef, ReferenceValue, Schema};
use crate::store::traits::EntityStore;

/// Repository operation a request needs the repository to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryMethod {
    FindOne,
    Save,
    Delete,
}

/// Find the class exported under a repository path
pub fn find_class<'s>(schema: &'s Schema, repository: &str) -> ReferenceResult<&'s ClassDef> {
    schema.get_class_by_path(repository).ok_or_else(|| {
        ReferenceError::not_found(format!("No repository exported at '{}'", repository))
    })
}

pub fn require_method(class: &ClassDef, method: RepositoryMethod) -> ReferenceResult<()> {
    let methods = &class.repository.methods;
    let exported = match method {
        RepositoryMethod::FindOne => methods.find_one,
        RepositoryMethod::Save => methods.save,
        RepositoryMethod::Delete => methods.delete,
    };
    if exported {
        Ok(())
    } else {
        Err(ReferenceError::method_not_supported(format!(
            "Repository '{}' does not export {:?}",
            class.repository.path, method
        )))
    }
}

/// Load a domain object of the given class, failing with NotFound if absent
pub async fn find_domain_object<S: EntityStore + ?Sized>(
    store: &S,
    class: &ClassDef,
    id: &str,
) -> ReferenceResult<Instance> {
    store
        .find_one(&class.id, &id.to_string())
        .await?
        .ok_or_else(|| {
            ReferenceError::not_found(format!("{} '{}' does not exist", class.id, id))
        })
}

/// Resolve a URL path segment to a property descriptor of the class
pub fn resolve_property<'s>(class: &'s ClassDef, path: &str) -> ReferenceResult<&'s PropertyDef> {
    class.get_property(path).ok_or_else(|| {
        ReferenceError::not_found(format!("{} has no property exported at '{}'", class.id, path))
    })
}

/// A property of one domain object, materialized for a single request
#[derive(Debug, Clone)]
pub struct ReferencedProperty<'s> {
    pub owner_class: &'s ClassDef,
    pub owner: Instance,
    pub property: &'s PropertyDef,
    /// Class of the referenced objects
    pub target_class: &'s ClassDef,
    /// Current value; `None` when the property is null
    pub value: Option<ReferenceValue>,
}

impl<'s> ReferencedProperty<'s> {
    /// Resolve `{repository}/{id}/{property}` down to the property's value.
    /// `method` is checked against the owning repository's exported methods
    /// in addition to `find_one`.
    pub async fn resolve<S: EntityStore + ?Sized>(
        store: &S,
        schema: &'s Schema,
        repository: &str,
        id: &str,
        property_path: &str,
        method: RepositoryMethod,
    ) -> ReferenceResult<ReferencedProperty<'s>> {
        let owner_class = find_class(schema, repository)?;
        require_method(owner_class, method)?;
        require_method(owner_class, RepositoryMethod::FindOne)?;

        let owner = find_domain_object(store, owner_class, id).await?;
        let property = resolve_property(owner_class, property_path)?;
        let target_class = schema.get_class(&property.target_class).ok_or_else(|| {
            anyhow::anyhow!(
                "Property '{}.{}' targets unknown class '{}'",
                owner_class.id,
                property.name,
                property.target_class
            )
        })?;
        let value = property.read(&owner)?;

        log::debug!(
            "Resolved {} '{}' property '{}' ({:?} of {})",
            owner_class.id,
            owner.id,
            property.name,
            property.cardinality,
            target_class.id
        );

        Ok(Self {
            owner_class,
            owner,
            property,
            target_class,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyDef, RepositoryMapping, RepositoryMethods};
    use crate::store::MemoryStore;

    fn schema() -> Schema {
        Schema {
            id: "test".to_string(),
            description: None,
            classes: vec![
                ClassDef::new("Order", RepositoryMapping::new("orders"))
                    .with_property(PropertyDef::collection("items", "Item")),
                ClassDef::new("Item", RepositoryMapping::new("items")),
                ClassDef::new(
                    "Archive",
                    RepositoryMapping::new("archives").with_methods(RepositoryMethods {
                        find_one: false,
                        save: true,
                        delete: true,
                    }),
                ),
            ],
        }
    }

    #[tokio::test]
    async fn test_resolve_referenced_property() {
        let schema = schema();
        let store = MemoryStore::new();
        store
            .save(Instance::new("Order", "5").with_reference(
                "items",
                ReferenceValue::Collection(vec!["1".to_string()]),
            ))
            .await
            .unwrap();

        let prop = ReferencedProperty::resolve(
            &store,
            &schema,
            "orders",
            "5",
            "items",
            RepositoryMethod::FindOne,
        )
        .await
        .unwrap();
        assert_eq!(prop.owner.id, "5");
        assert_eq!(prop.target_class.id, "Item");
        assert_eq!(prop.value, Some(ReferenceValue::Collection(vec!["1".to_string()])));
    }

    #[tokio::test]
    async fn test_missing_pieces_are_not_found() {
        let schema = schema();
        let store = MemoryStore::new();
        store.save(Instance::new("Order", "5")).await.unwrap();

        for (repo, id, prop) in [
            ("nope", "5", "items"),
            ("orders", "6", "items"),
            ("orders", "5", "nope"),
        ] {
            let result = ReferencedProperty::resolve(
                &store,
                &schema,
                repo,
                id,
                prop,
                RepositoryMethod::FindOne,
            )
            .await;
            assert!(matches!(result, Err(ReferenceError::NotFound(_))), "{repo}/{id}/{prop}");
        }
    }

    #[tokio::test]
    async fn test_unexported_find_one_is_method_not_supported() {
        let schema = schema();
        let store = MemoryStore::new();

        let result = ReferencedProperty::resolve(
            &store,
            &schema,
            "archives",
            "1",
            "items",
            RepositoryMethod::Save,
        )
        .await;
        assert!(matches!(result, Err(ReferenceError::MethodNotSupported(_))));
    }
}
