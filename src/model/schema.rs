use crate::model::{ClassDef, Id};
use anyhow::{bail, Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The property descriptor table for every exported class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: Id,
    /// Collection of class definitions
    pub classes: Vec<ClassDef>,
    /// Optional schema description
    #[serde(default)]
    pub description: Option<String>,
}

impl Schema {
    /// Load and validate a schema from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let schema: Schema = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse schema file {}", path.display()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Find a class definition by ID
    pub fn get_class(&self, class_id: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|class| class.id == class_id)
    }

    /// Find the class exported under a repository path
    pub fn get_class_by_path(&self, repository_path: &str) -> Option<&ClassDef> {
        self.classes
            .iter()
            .find(|class| class.repository.path == repository_path)
    }

    /// Check that repository paths and property paths are unique and every
    /// property targets a known class
    pub fn validate(&self) -> Result<()> {
        let duplicate_paths: Vec<&str> = self
            .classes
            .iter()
            .map(|c| c.repository.path.as_str())
            .duplicates()
            .collect();
        if !duplicate_paths.is_empty() {
            bail!(
                "Duplicate repository paths in schema '{}': {}",
                self.id,
                duplicate_paths.join(", ")
            );
        }

        for class in &self.classes {
            let duplicate_props: Vec<&str> = class
                .properties
                .iter()
                .map(|p| p.exported_path())
                .duplicates()
                .collect();
            if !duplicate_props.is_empty() {
                bail!(
                    "Duplicate property paths on class '{}': {}",
                    class.id,
                    duplicate_props.join(", ")
                );
            }

            for property in &class.properties {
                if self.get_class(&property.target_class).is_none() {
                    bail!(
                        "Property '{}.{}' targets unknown class '{}'",
                        class.id,
                        property.name,
                        property.target_class
                    );
                }
            }
        }

        Ok(())
    }
}
