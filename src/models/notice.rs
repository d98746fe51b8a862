use serde::{Deserialize, Serialize};

use super::de::flexible_string;

/// A notice-board post. The id is the stable key for edits and deletes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notice {
    #[serde(deserialize_with = "flexible_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body of `POST /add-post` and `PUT /update-post/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NoticeDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}
