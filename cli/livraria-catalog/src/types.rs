//! Catalog interaction types.
//!
//! The `Volume*` types mirror the wire format of the remote catalog.
//! [Book] is the normalized domain entity the rest of the application uses.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MappingError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of a volumes query.
///
/// Items are kept as raw JSON so that a single malformed record
/// can be dropped without rejecting the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesResponse {
    #[serde(default)]
    pub total_items: Option<u64>,
    /// Absent when the query matched nothing.
    #[serde(default)]
    pub items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub image_links: Option<ImageLinks>,
    pub published_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A book as returned by a catalog search.
///
/// `id` is the only identity key; two books with the same id are the same book.
/// Books are never mutated, a re-fetch replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    /// `None` when the catalog did not list any authors.
    /// Presentation decides how to render an unknown author.
    pub authors: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
}

impl Book {
    /// A book with only the required fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: None,
            thumbnail_url: None,
            published_date: None,
            description: None,
        }
    }
}

impl TryFrom<Volume> for Book {
    type Error = MappingError;

    fn try_from(volume: Volume) -> Result<Self, MappingError> {
        let Volume { id, volume_info } = volume;
        let Some(title) = volume_info.title else {
            return Err(MappingError::MissingTitle { id });
        };

        Ok(Book {
            id,
            title,
            authors: volume_info.authors,
            thumbnail_url: volume_info.image_links.and_then(|links| links.thumbnail),
            published_date: volume_info.published_date,
            description: volume_info.description,
        })
    }
}

impl TryFrom<serde_json::Value> for Book {
    type Error = MappingError;

    fn try_from(value: serde_json::Value) -> Result<Self, MappingError> {
        let volume: Volume = serde_json::from_value(value).map_err(MappingError::Malformed)?;
        volume.try_into()
    }
}

/// Map raw catalog records into books, preserving order.
///
/// Records that cannot be mapped are logged and skipped.
pub fn map_volumes(items: impl IntoIterator<Item = serde_json::Value>) -> Vec<Book> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| match Book::try_from(item) {
            Ok(book) => Some(book),
            Err(err) => {
                warn!(position, %err, "dropping catalog record");
                None
            },
        })
        .collect()
}
