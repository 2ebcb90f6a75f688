use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Empty until the store assigns one on insert.
    #[serde(default, deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub category: String,
    #[serde(default, deserialize_with = "wire::amount")]
    pub price: u64,
    #[serde(default, deserialize_with = "wire::text")]
    pub image: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub description: String,
    #[serde(default, deserialize_with = "wire::list", skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "wire::list", skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<String>,
    #[serde(default, deserialize_with = "wire::optional_text", skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text", skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(
        default,
        alias = "alcoholContent",
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub alcohol_content: Option<String>,
    #[serde(
        default,
        alias = "agingTime",
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub aging_time: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            image: String::new(),
            description: String::new(),
            benefits: Vec::new(),
            badges: Vec::new(),
            origin: None,
            volume: None,
            alcohol_content: None,
            aging_time: None,
            created_at: None,
        }
    }
}
