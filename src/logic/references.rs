use std::collections::BTreeMap;

use crate::logic::error::{ReferenceError, ReferenceResult};
use crate::logic::events::EventPublisher;
use crate::logic::lookup::{
    find_class, find_domain_object, require_method, ReferencedProperty, RepositoryMethod,
};
use crate::logic::render::{compact_rel, render_entity, LinkRenderer};
use crate::model::{
    id_from_href, Cardinality, ClassDef, CompactResource, EntityResource, Id, IncomingLinks,
    Instance, Link, LinkEvent, LinkEventKind, PropertyContent, PropertyResource, ReferenceValue,
    Resource, Schema,
};
use crate::store::traits::Store;

/// How incoming links are combined with the current property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkUpdate {
    /// PUT: the incoming links become the whole value
    Replace,
    /// POST: the incoming links are added to the current value
    Append,
}

/// A rendered read together with the `Content-Location` to report, if any
#[derive(Debug, Clone)]
pub struct Followed<T> {
    pub resource: T,
    pub content_location: Option<String>,
}

/// Reads and mutates property references of exported domain objects
pub struct ReferenceService<S: Store> {
    store: S,
    schema: Schema,
    events: EventPublisher,
}

impl<S: Store> ReferenceService<S> {
    pub fn new(store: S, schema: Schema, events: EventPublisher) -> Self {
        Self {
            store,
            schema,
            events,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render a single entity at its canonical location
    pub async fn get_entity(
        &self,
        links: &dyn LinkRenderer,
        repository: &str,
        id: &str,
    ) -> ReferenceResult<EntityResource> {
        let class = find_class(&self.schema, repository)?;
        require_method(class, RepositoryMethod::FindOne)?;
        let instance = find_domain_object(&self.store, class, id).await?;
        Ok(render_entity(links, class, &instance))
    }

    /// GET `/{repository}/{id}/{property}` with embedded resources
    pub async fn follow(
        &self,
        links: &dyn LinkRenderer,
        repository: &str,
        id: &str,
        property: &str,
    ) -> ReferenceResult<Followed<PropertyResource>> {
        let prop = self
            .resolve(repository, id, property, RepositoryMethod::FindOne)
            .await?;
        let value = prop.value.as_ref().ok_or_else(|| null_property(&prop))?;

        match value {
            ReferenceValue::Single(target_id) => {
                let target = self.load_single(&prop, target_id).await?;
                let resource = render_entity(links, prop.target_class, &target);
                let content_location = resource.self_link().map(|l| l.href.clone());
                Ok(Followed {
                    resource: Resource::new(PropertyContent::Single(resource)),
                    content_location,
                })
            }
            ReferenceValue::Collection(ids) => {
                let mut resources = Vec::with_capacity(ids.len());
                for target_id in ids {
                    if let Some(target) = self.load_existing(&prop, target_id).await? {
                        resources.push(render_entity(links, prop.target_class, &target));
                    }
                }
                Ok(Followed {
                    resource: Resource::new(PropertyContent::Collection(resources)),
                    content_location: None,
                })
            }
            ReferenceValue::Map(entries) => {
                let mut resources = BTreeMap::new();
                for (key, target_id) in entries {
                    if let Some(target) = self.load_existing(&prop, target_id).await? {
                        let resource = render_entity(links, prop.target_class, &target);
                        resources.insert(key.clone(), resource);
                    }
                }
                Ok(Followed {
                    resource: Resource::new(PropertyContent::Map(resources)),
                    content_location: None,
                })
            }
        }
    }

    /// GET `/{repository}/{id}/{property}/{property_id}`
    pub async fn follow_by_id(
        &self,
        links: &dyn LinkRenderer,
        repository: &str,
        id: &str,
        property: &str,
        property_id: &str,
    ) -> ReferenceResult<Followed<EntityResource>> {
        let prop = self
            .resolve(repository, id, property, RepositoryMethod::FindOne)
            .await?;
        let value = prop.value.as_ref().ok_or_else(|| null_property(&prop))?;

        if !value.contains(property_id) {
            return Err(ReferenceError::not_found(format!(
                "{} '{}' property '{}' does not reference '{}'",
                prop.owner_class.id, prop.owner.id, prop.property.name, property_id
            )));
        }

        let target = find_domain_object(&self.store, prop.target_class, property_id).await?;
        let resource = render_entity(links, prop.target_class, &target);
        let content_location = resource.self_link().map(|l| l.href.clone());
        Ok(Followed {
            resource,
            content_location,
        })
    }

    /// GET `/{repository}/{id}/{property}` as links only. Element hrefs are
    /// built from the stored ids so they round-trip through PUT.
    pub async fn follow_compact(
        &self,
        links: &dyn LinkRenderer,
        repository: &str,
        id: &str,
        property: &str,
    ) -> ReferenceResult<CompactResource> {
        let prop = self
            .resolve(repository, id, property, RepositoryMethod::FindOne)
            .await?;
        let value = prop.value.as_ref().ok_or_else(|| null_property(&prop))?;

        let rel = compact_rel(prop.owner_class, prop.property, property, prop.target_class);
        let owner_repository = &prop.owner_class.repository;

        let compact_links = match value {
            ReferenceValue::Single(target_id) => {
                self.load_single(&prop, target_id).await?;
                let href = links.property_uri(owner_repository, &prop.owner.id, property);
                vec![Link::new(href, rel)]
            }
            ReferenceValue::Collection(ids) => {
                let mut compact_links = Vec::with_capacity(ids.len());
                for target_id in ids {
                    if self.load_existing(&prop, target_id).await?.is_some() {
                        let href = links.element_uri(
                            owner_repository,
                            &prop.owner.id,
                            property,
                            target_id,
                        );
                        compact_links.push(Link::new(href, rel.as_str()));
                    }
                }
                compact_links
            }
            ReferenceValue::Map(entries) => {
                let mut compact_links = Vec::with_capacity(entries.len());
                for (key, target_id) in entries {
                    if self.load_existing(&prop, target_id).await?.is_some() {
                        let href = links.entity_uri(&prop.target_class.repository, target_id);
                        compact_links.push(Link::new(href, key.as_str()));
                    }
                }
                compact_links
            }
        };

        Ok(CompactResource::from_links(compact_links))
    }

    /// PUT (`Replace`) or POST (`Append`) links to `/{repository}/{id}/{property}`
    pub async fn update(
        &self,
        repository: &str,
        id: &str,
        property: &str,
        mode: LinkUpdate,
        incoming: IncomingLinks,
    ) -> ReferenceResult<()> {
        let prop = self
            .resolve(repository, id, property, RepositoryMethod::Save)
            .await?;

        let new_value = match prop.property.cardinality {
            Cardinality::Collection => {
                let mut ids = match (mode, &prop.value) {
                    (LinkUpdate::Append, Some(ReferenceValue::Collection(existing))) => {
                        existing.clone()
                    }
                    _ => Vec::new(),
                };
                for link in &incoming.links {
                    let target_id = self.linked_id(&prop, &link.href).await?;
                    if !ids.contains(&target_id) {
                        ids.push(target_id);
                    }
                }
                ReferenceValue::Collection(ids)
            }
            Cardinality::Map => {
                let mut entries = match (mode, &prop.value) {
                    (LinkUpdate::Append, Some(ReferenceValue::Map(existing))) => existing.clone(),
                    _ => BTreeMap::new(),
                };
                for link in &incoming.links {
                    let target_id = self.linked_id(&prop, &link.href).await?;
                    entries.insert(link.rel.clone(), target_id);
                }
                ReferenceValue::Map(entries)
            }
            Cardinality::Single => {
                if mode == LinkUpdate::Append {
                    return Err(ReferenceError::bad_request(format!(
                        "Cannot POST a reference to singular property '{}'; use PUT",
                        prop.property.name
                    )));
                }
                if incoming.links.len() != 1 {
                    return Err(ReferenceError::bad_request(format!(
                        "Must send exactly 1 link to update singular property '{}', got {}",
                        prop.property.name,
                        incoming.links.len()
                    )));
                }
                ReferenceValue::Single(self.linked_id(&prop, &incoming.links[0].href).await?)
            }
        };

        self.save_change(
            &prop,
            Some(new_value),
            LinkEventKind::BeforeLinkSave,
            LinkEventKind::AfterLinkSave,
        )
        .await?;
        Ok(())
    }

    /// DELETE `/{repository}/{id}/{property}`: clears a singular property
    pub async fn delete(&self, repository: &str, id: &str, property: &str) -> ReferenceResult<()> {
        let prop = self
            .resolve(repository, id, property, RepositoryMethod::Delete)
            .await?;
        let cardinality = prop.property.cardinality;
        if cardinality.is_collection_like() || cardinality.is_map() {
            return Err(ReferenceError::method_not_supported(format!(
                "DELETE of whole {:?} property '{}'; delete elements by id instead",
                prop.property.cardinality, prop.property.name
            )));
        }
        if prop.value.is_none() {
            return Ok(());
        }

        self.save_change(
            &prop,
            None,
            LinkEventKind::BeforeLinkDelete,
            LinkEventKind::AfterLinkDelete,
        )
        .await?;
        Ok(())
    }

    /// DELETE `/{repository}/{id}/{property}/{property_id}`
    pub async fn delete_by_id(
        &self,
        repository: &str,
        id: &str,
        property: &str,
        property_id: &str,
    ) -> ReferenceResult<()> {
        let prop = self
            .resolve(repository, id, property, RepositoryMethod::Delete)
            .await?;
        let Some(value) = prop.value.as_ref() else {
            return Ok(());
        };
        if !value.contains(property_id) {
            log::debug!(
                "{} '{}' property '{}' does not reference '{}'; nothing to delete",
                prop.owner_class.id,
                prop.owner.id,
                prop.property.name,
                property_id
            );
            return Ok(());
        }

        let new_value = match value {
            ReferenceValue::Single(_) => None,
            ReferenceValue::Collection(ids) => Some(ReferenceValue::Collection(
                ids.iter()
                    .filter(|candidate| *candidate != property_id)
                    .cloned()
                    .collect(),
            )),
            ReferenceValue::Map(entries) => Some(ReferenceValue::Map(
                entries
                    .iter()
                    .filter(|(_, candidate)| *candidate != property_id)
                    .map(|(key, candidate)| (key.clone(), candidate.clone()))
                    .collect(),
            )),
        };

        self.save_change(
            &prop,
            new_value,
            LinkEventKind::BeforeLinkDelete,
            LinkEventKind::AfterLinkDelete,
        )
        .await?;
        Ok(())
    }

    async fn resolve<'s>(
        &'s self,
        repository: &str,
        id: &str,
        property: &str,
        method: RepositoryMethod,
    ) -> ReferenceResult<ReferencedProperty<'s>> {
        ReferencedProperty::resolve(&self.store, &self.schema, repository, id, property, method)
            .await
    }

    async fn load_target(&self, class: &ClassDef, id: &Id) -> ReferenceResult<Option<Instance>> {
        Ok(self.store.find_one(&class.id, id).await?)
    }

    /// Load the object a singular property points at; a dangling id is NotFound
    async fn load_single(
        &self,
        prop: &ReferencedProperty<'_>,
        target_id: &Id,
    ) -> ReferenceResult<Instance> {
        self.load_target(prop.target_class, target_id)
            .await?
            .ok_or_else(|| {
                ReferenceError::not_found(format!(
                    "{} '{}' referenced by '{}' does not exist",
                    prop.target_class.id, target_id, prop.property.name
                ))
            })
    }

    /// Load a referenced element, skipping ids whose object is gone
    async fn load_existing(
        &self,
        prop: &ReferencedProperty<'_>,
        target_id: &Id,
    ) -> ReferenceResult<Option<Instance>> {
        let target = self.load_target(prop.target_class, target_id).await?;
        if target.is_none() {
            log::warn!(
                "{} '{}' property '{}' references missing {} '{}'",
                prop.owner_class.id,
                prop.owner.id,
                prop.property.name,
                prop.target_class.id,
                target_id
            );
        }
        Ok(target)
    }

    /// Resolve an incoming href to the id of an existing target object
    async fn linked_id(&self, prop: &ReferencedProperty<'_>, href: &str) -> ReferenceResult<Id> {
        let target_id = id_from_href(href).ok_or_else(|| {
            ReferenceError::bad_request(format!("Link '{}' does not name an object", href))
        })?;
        let target = find_domain_object(&self.store, prop.target_class, &target_id).await?;
        Ok(target.id)
    }

    /// Apply a new value on a copy of the owner, then publish, save, publish
    async fn save_change(
        &self,
        prop: &ReferencedProperty<'_>,
        new_value: Option<ReferenceValue>,
        before: LinkEventKind,
        after: LinkEventKind,
    ) -> ReferenceResult<Instance> {
        let mut owner = prop.owner.clone();
        prop.property.write(&mut owner, new_value)?;
        owner.touch();

        self.events.publish(&LinkEvent {
            kind: before,
            property: prop.property.name.clone(),
            entity: owner.clone(),
            previous: prop.value.clone(),
        })?;

        let saved = self.store.save(owner).await?;
        log::info!(
            "Saved {} '{}' after changing property '{}'",
            saved.class_id,
            saved.id,
            prop.property.name
        );

        self.events.publish(&LinkEvent {
            kind: after,
            property: prop.property.name.clone(),
            entity: saved.clone(),
            previous: prop.value.clone(),
        })?;

        Ok(saved)
    }
}

fn null_property(prop: &ReferencedProperty<'_>) -> ReferenceError {
    ReferenceError::not_found(format!(
        "{} '{}' property '{}' is null",
        prop.owner_class.id, prop.owner.id, prop.property.name
    ))
}
