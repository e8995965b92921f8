use crate::model::{Instance, ReferenceValue};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkEventKind {
    BeforeLinkSave,
    AfterLinkSave,
    BeforeLinkDelete,
    AfterLinkDelete,
}

impl LinkEventKind {
    pub fn is_before(&self) -> bool {
        matches!(self, LinkEventKind::BeforeLinkSave | LinkEventKind::BeforeLinkDelete)
    }
}

impl fmt::Display for LinkEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkEventKind::BeforeLinkSave => "before-link-save",
            LinkEventKind::AfterLinkSave => "after-link-save",
            LinkEventKind::BeforeLinkDelete => "before-link-delete",
            LinkEventKind::AfterLinkDelete => "after-link-delete",
        };
        f.write_str(name)
    }
}

/// Notification published around every property reference mutation.
///
/// `entity` is the owner with the change applied (the saved instance for
/// after events); `previous` is the property value before the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkEvent {
    pub kind: LinkEventKind,
    pub property: String,
    pub entity: Instance,
    pub previous: Option<ReferenceValue>,
}
