use crate::model::{Cardinality, Id, Instance, ReferenceValue};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Represents an entity type and the repository that exports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Unique identifier for this class (e.g., "Order", "Item")
    pub id: Id,

    /// Relation name of the entity type, used when composing compact link rels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,

    /// Optional description of what this class represents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Repository exporting instances of this class
    pub repository: RepositoryMapping,

    /// Reference properties of this class
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

impl ClassDef {
    pub fn new(id: impl Into<Id>, repository: RepositoryMapping) -> Self {
        Self {
            id: id.into(),
            rel: None,
            description: None,
            repository,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Entity relation name, defaulting to the lowercased class id
    pub fn entity_rel(&self) -> String {
        self.rel.clone().unwrap_or_else(|| self.id.to_lowercase())
    }

    /// Resolve a URL path segment to a property. Exported paths win over raw
    /// property names.
    pub fn get_property(&self, path: &str) -> Option<&PropertyDef> {
        self.properties
            .iter()
            .find(|p| p.path.as_deref() == Some(path))
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|p| p.path.is_none() && p.name == path)
            })
    }
}

/// Exported repository path, relation name and supported methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMapping {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default)]
    pub methods: RepositoryMethods,
}

impl RepositoryMapping {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rel: None,
            methods: RepositoryMethods::default(),
        }
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn with_methods(mut self, methods: RepositoryMethods) -> Self {
        self.methods = methods;
        self
    }

    /// Repository relation name, defaulting to the path
    pub fn repository_rel(&self) -> &str {
        self.rel.as_deref().unwrap_or(&self.path)
    }
}

/// Which repository operations are exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMethods {
    #[serde(default = "default_true")]
    pub find_one: bool,
    #[serde(default = "default_true")]
    pub save: bool,
    #[serde(default = "default_true")]
    pub delete: bool,
}

impl Default for RepositoryMethods {
    fn default() -> Self {
        Self {
            find_one: true,
            save: true,
            delete: true,
        }
    }
}

/// Describes one reference property of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name, also the key in `Instance::references`
    pub name: String,

    /// Exported URL path segment, if different from the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Explicit relation name for compact links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,

    pub cardinality: Cardinality,

    /// Class of the referenced objects (element type for collections,
    /// value type for maps)
    #[serde(rename = "target")]
    pub target_class: Id,
}

impl PropertyDef {
    pub fn new(
        name: impl Into<String>,
        cardinality: Cardinality,
        target_class: impl Into<Id>,
    ) -> Self {
        Self {
            name: name.into(),
            path: None,
            rel: None,
            cardinality,
            target_class: target_class.into(),
        }
    }

    pub fn single(name: impl Into<String>, target_class: impl Into<Id>) -> Self {
        Self::new(name, Cardinality::Single, target_class)
    }

    pub fn collection(name: impl Into<String>, target_class: impl Into<Id>) -> Self {
        Self::new(name, Cardinality::Collection, target_class)
    }

    pub fn map(name: impl Into<String>, target_class: impl Into<Id>) -> Self {
        Self::new(name, Cardinality::Map, target_class)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn exported_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }

    /// Read the current value of this property from an instance
    pub fn read(&self, instance: &Instance) -> Result<Option<ReferenceValue>> {
        match instance.references.get(&self.name) {
            None => Ok(None),
            Some(value) if value.cardinality() == self.cardinality => Ok(Some(value.clone())),
            Some(value) => bail!(
                "Property '{}' of {} '{}' holds a {:?} value but is declared {:?}",
                self.name,
                instance.class_id,
                instance.id,
                value.cardinality(),
                self.cardinality
            ),
        }
    }

    /// Write a new value (or null) for this property into an instance
    pub fn write(&self, instance: &mut Instance, value: Option<ReferenceValue>) -> Result<()> {
        match value {
            None => {
                instance.references.remove(&self.name);
            }
            Some(value) if value.cardinality() == self.cardinality => {
                instance.references.insert(self.name.clone(), value);
            }
            Some(value) => bail!(
                "Cannot assign a {:?} value to {:?} property '{}'",
                value.cardinality(),
                self.cardinality,
                self.name
            ),
        }
        Ok(())
    }
}
