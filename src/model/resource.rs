use crate::model::id_from_href;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SELF_REL: &str = "self";

/// Media types understood by the property reference endpoints
pub mod media_type {
    pub const JSON: &str = "application/json";
    pub const VERBOSE_JSON: &str = "application/x-verbose+json";
    pub const COMPACT_JSON: &str = "application/x-compact+json";
    pub const URI_LIST: &str = "text/uri-list";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }

    pub fn is_self(&self) -> bool {
        self.rel == SELF_REL
    }
}

/// A rendered entity: its attributes plus hypermedia links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResource {
    #[serde(flatten)]
    pub content: serde_json::Map<String, serde_json::Value>,
    pub links: Vec<Link>,
}

impl EntityResource {
    pub fn self_link(&self) -> Option<&Link> {
        self.links.iter().find(|l| l.is_self())
    }
}

/// Generic wrapper pairing some content with links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<T> {
    pub content: T,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl<T> Resource<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: Vec::new(),
        }
    }
}

/// What a followed property reference renders to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyContent {
    Single(EntityResource),
    Collection(Vec<EntityResource>),
    Map(BTreeMap<String, EntityResource>),
}

pub type PropertyResource = Resource<PropertyContent>;

/// Links-only rendering of a property reference
pub type CompactResource = Resource<Vec<serde_json::Value>>;

impl CompactResource {
    pub fn from_links(links: Vec<Link>) -> Self {
        Self {
            content: Vec::new(),
            links,
        }
    }

    /// One href per line, as `text/uri-list` expects
    pub fn to_uri_list(&self) -> String {
        self.links
            .iter()
            .map(|l| l.href.as_str())
            .collect::<Vec<_>>()
            .join("\r\n")
    }
}

/// Links sent by a client to add or replace property references
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IncomingLinks {
    #[serde(default)]
    pub links: Vec<Link>,
}

impl IncomingLinks {
    pub fn new(links: Vec<Link>) -> Self {
        Self { links }
    }

    /// Parse a `text/uri-list` body. Blank lines and `#` comments are
    /// ignored; each link is named after the id it points at.
    pub fn from_uri_list(body: &str) -> Self {
        let links = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|href| {
                let rel = id_from_href(href).unwrap_or_else(|| href.to_string());
                Link::new(href, rel)
            })
            .collect();
        Self { links }
    }
}
