use serde::{Deserialize, Serialize};

pub type Id = String;

/// How many referenced objects a property holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Collection,
    Map,
}

impl Cardinality {
    pub fn is_collection_like(&self) -> bool {
        matches!(self, Cardinality::Collection)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Cardinality::Map)
    }
}

/// Extract the object id from a link href: the last non-empty path segment,
/// percent-decoded. `None` when there is no segment or it is not UTF-8.
pub fn id_from_href(href: &str) -> Option<Id> {
    let trimmed = href.trim().trim_end_matches('/');
    let segment = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment).ok().map(|id| id.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_href() {
        assert_eq!(id_from_href("http://localhost/items/9").as_deref(), Some("9"));
        assert_eq!(id_from_href("http://localhost/items/9/").as_deref(), Some("9"));
        assert_eq!(id_from_href("9").as_deref(), Some("9"));
        assert_eq!(id_from_href("http://localhost/items/").as_deref(), Some("items"));
        assert_eq!(id_from_href(""), None);
        assert_eq!(id_from_href("/"), None);
    }

    #[test]
    fn test_id_from_href_decodes_segment() {
        assert_eq!(id_from_href("http://localhost/items/a%2Fb").as_deref(), Some("a/b"));
        assert_eq!(id_from_href("http://localhost/items/Um%C3%A5").as_deref(), Some("Umeå"));
        assert_eq!(
            id_from_href("http://localhost/items/two%20words").as_deref(),
            Some("two words")
        );
        assert_eq!(id_from_href("http://localhost/items/%FF"), None);
    }
}
