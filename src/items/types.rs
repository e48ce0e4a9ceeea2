//! Item types shared by the store and the HTTP layer.

use serde::{Deserialize, Serialize};

/// Identifier assigned to an item by the store.
pub type ItemId = i64;

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Item name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

impl Item {
    /// Build an item from an id and the client-supplied values.
    pub fn from_new(id: ItemId, values: NewItem) -> Self {
        Self {
            id,
            name: values.name,
            description: values.description,
        }
    }

    /// Copy of the client-facing values, without the id.
    pub fn values(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Client-supplied item values for create and update.
///
/// Missing fields decode as empty strings. Any `id` in the body is ignored;
/// ids always come from the store or the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewItem {
    /// Item name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

impl NewItem {
    /// Create a new payload.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
