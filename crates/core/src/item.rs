//! Catalog items produced by crawlers and stored in the cache.

use serde::{Deserialize, Serialize};

/// A single catalog listing.
///
/// Every textual field is optional: upstream records are projected leniently and a
/// missing field is serialized as `null` rather than failing the crawl.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
    pub store: Option<String>,
    pub state: Option<String>,
}

impl Item {
    /// Item carrying only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Default::default() }
    }
}
