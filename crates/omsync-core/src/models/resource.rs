//! Resource (attachment) model

use serde::{Deserialize, Serialize};

/// A binary attachment as served by the Memos API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource name, e.g. `resources/7`
    pub name: String,
    /// Original upload file name, if any
    #[serde(default)]
    pub filename: Option<String>,
    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub create_time: String,
    /// Content MIME type
    #[serde(default, rename = "type")]
    pub mime_type: String,
    /// Owning memo name; empty when unattached
    #[serde(default)]
    pub memo: Option<String>,
}

impl Resource {
    /// Owning memo name, if the resource is attached to one.
    pub fn owner_memo(&self) -> Option<&str> {
        self.memo
            .as_deref()
            .map(str::trim)
            .filter(|memo| !memo.is_empty())
    }
}

/// The full resource listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub resources: Vec<Resource>,
}
