use serde::{Deserialize, Serialize};

/// Bullet or numbered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    Unordered,
    Ordered,
}

impl ListType {
    pub fn from_tag(tag: &str) -> Option<ListType> {
        match tag {
            "ul" => Some(ListType::Unordered),
            "ol" => Some(ListType::Ordered),
            _ => None,
        }
    }
}

/// A single bullet; nested lists are flattened into items with a higher level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Nesting depth, 0 for top-level items.
    pub level: u8,
    pub text: String,
    pub html: String,
}

/// Payload of a merged list block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContent {
    pub list_type: ListType,
    /// `start` attribute of an ordered list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    pub items: Vec<ListItem>,
}
