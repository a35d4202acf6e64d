use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Resume token round-tripped through the host's "open catalog item"
/// boundary. Serializes to a compact JSON string; every populated field
/// survives the round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Alternate stream URLs for the same item, when the provider lists
    /// several mirrors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl LoadData {
    pub fn encode(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(token: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(token)?)
    }
}

/// One browsable item handed to the host UI: a display name, a poster,
/// and an opaque resumable token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub name: String,
    /// Serialized [`LoadData`].
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Named bucket of catalog items (an alphabetic letter, `"0-9"`, `"#"`,
/// or a `group-title` value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGroup {
    pub name: String,
    pub items: Vec<CatalogItem>,
}
