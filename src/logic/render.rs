use crate::model::{
    ClassDef, EntityResource, Instance, Link, PropertyDef, RepositoryMapping, SELF_REL,
};

/// Percent-encode one path segment so ids holding `/`, spaces or non-ASCII
/// text stay a single segment of an ASCII href.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Builds the hrefs of exported resources. Handlers get one per request so
/// the base URI can follow the request's host.
pub trait LinkRenderer: Send + Sync {
    /// Canonical location of an entity
    fn entity_uri(&self, repository: &RepositoryMapping, id: &str) -> String;

    /// Location of a property of an entity
    fn property_uri(
        &self,
        repository: &RepositoryMapping,
        id: &str,
        property_path: &str,
    ) -> String {
        format!("{}/{}", self.entity_uri(repository, id), encode_segment(property_path))
    }

    /// Location of one element of a collection-like property
    fn element_uri(
        &self,
        repository: &RepositoryMapping,
        id: &str,
        property_path: &str,
        element_id: &str,
    ) -> String {
        format!(
            "{}/{}",
            self.property_uri(repository, id, property_path),
            encode_segment(element_id)
        )
    }

    fn self_link(&self, repository: &RepositoryMapping, id: &str) -> Link {
        Link::new(self.entity_uri(repository, id), SELF_REL)
    }
}

/// Renders links as `{base}/{repository}/{id}`
#[derive(Debug, Clone)]
pub struct BaseUriLinks {
    base_uri: String,
}

impl BaseUriLinks {
    pub fn new(base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into().trim_end_matches('/').to_string();
        Self { base_uri }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

impl LinkRenderer for BaseUriLinks {
    fn entity_uri(&self, repository: &RepositoryMapping, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_uri,
            encode_segment(&repository.path),
            encode_segment(id)
        )
    }
}

/// Wrap an instance as a resource carrying its self link and one link per
/// reference property of its class.
pub fn render_entity(
    links: &dyn LinkRenderer,
    class: &ClassDef,
    instance: &Instance,
) -> EntityResource {
    let mut resource_links = Vec::with_capacity(class.properties.len() + 1);
    resource_links.push(links.self_link(&class.repository, &instance.id));
    for property in &class.properties {
        let href = links.property_uri(&class.repository, &instance.id, property.exported_path());
        let rel = property.rel.as_deref().unwrap_or(property.exported_path());
        resource_links.push(Link::new(href, rel));
    }

    EntityResource {
        content: instance.attributes.clone(),
        links: resource_links,
    }
}

/// Relation name used for compact property links:
/// `{repository rel}.{entity rel}.{property rel}.{target repository rel}`.
/// Falls back to the requested path segment when the property has no rel.
pub fn compact_rel(
    owner: &ClassDef,
    property: &PropertyDef,
    requested_path: &str,
    target: &ClassDef,
) -> String {
    format!(
        "{}.{}.{}.{}",
        owner.repository.repository_rel(),
        owner.entity_rel(),
        property.rel.as_deref().unwrap_or(requested_path),
        target.repository.repository_rel()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_class() -> ClassDef {
        ClassDef::new("Order", RepositoryMapping::new("orders"))
            .with_property(PropertyDef::collection("items", "Item"))
            .with_property(PropertyDef::single("customer", "Customer").with_rel("buyer"))
    }

    #[test]
    fn test_base_uri_links_trim_trailing_slash() {
        let links = BaseUriLinks::new("http://localhost:3001/");
        let repo = RepositoryMapping::new("orders");
        assert_eq!(links.base_uri(), "http://localhost:3001");
        assert_eq!(links.entity_uri(&repo, "5"), "http://localhost:3001/orders/5");
        assert_eq!(
            links.property_uri(&repo, "5", "items"),
            "http://localhost:3001/orders/5/items"
        );
        assert_eq!(links.self_link(&repo, "5").rel, "self");
        assert_eq!(
            links.element_uri(&repo, "5", "items", "9"),
            "http://localhost:3001/orders/5/items/9"
        );
    }

    #[test]
    fn test_ids_are_percent_encoded_as_one_segment() {
        let links = BaseUriLinks::new("http://localhost");
        let repo = RepositoryMapping::new("items");
        assert_eq!(links.entity_uri(&repo, "a/b"), "http://localhost/items/a%2Fb");
        assert_eq!(links.entity_uri(&repo, "Umeå"), "http://localhost/items/Um%C3%A5");
        assert_eq!(
            links.element_uri(&RepositoryMapping::new("orders"), "5", "items", "two words"),
            "http://localhost/orders/5/items/two%20words"
        );
    }

    #[test]
    fn test_render_entity_has_exactly_one_self_link() {
        let links = BaseUriLinks::new("http://localhost");
        let order = Instance::new("Order", "5").with_attribute("total", json!(42));
        let resource = render_entity(&links, &order_class(), &order);

        assert_eq!(resource.content.get("total"), Some(&json!(42)));
        assert_eq!(resource.links.iter().filter(|l| l.is_self()).count(), 1);
        assert_eq!(
            resource.links,
            vec![
                Link::new("http://localhost/orders/5", "self"),
                Link::new("http://localhost/orders/5/items", "items"),
                Link::new("http://localhost/orders/5/customer", "buyer"),
            ]
        );
    }

    #[test]
    fn test_compact_rel_composition() {
        let owner = order_class();
        let item = ClassDef::new("Item", RepositoryMapping::new("items").with_rel("stock"));
        let items = owner.get_property("items").unwrap();
        let customer = owner.get_property("customer").unwrap();
        let customers = ClassDef::new("Customer", RepositoryMapping::new("customers"));

        assert_eq!(compact_rel(&owner, items, "items", &item), "orders.order.items.stock");
        assert_eq!(
            compact_rel(&owner, customer, "customer", &customers),
            "orders.order.buyer.customers"
        );
    }
}
