//! Page types
//!
//! Defines the page containers returned by paginated endpoints and their
//! wire representation.

use crate::error::{Error, Result};
use crate::models::{strip_nulls, Model};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Deserializer, Serialize};

/// A bounded batch of results from a paginated endpoint
pub trait Page {
    /// Type of the contained items
    type Item;

    /// Items of this page, in server order
    fn items(&self) -> &[Self::Item];

    /// Consume the page, keeping only its items
    fn into_items(self) -> Vec<Self::Item>;

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

// ============================================================================
// Numbered Page
// ============================================================================

/// A page from an endpoint using page-number pagination
///
/// `page_number` is zero-based. `page_size` is the requested size, so the last
/// page may hold fewer items. `total_elements` can change between pages when
/// data changes upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct NumberedPage<T> {
    #[serde(default = "Vec::new", deserialize_with = "deserialize_items")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(default)]
    pub has_next: Option<bool>,
}

impl<T> Default for NumberedPage<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> NumberedPage<T> {
    /// Create a page holding only items
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            page_number: None,
            page_size: None,
            total_elements: None,
            has_next: None,
        }
    }

    /// Set the page number
    #[must_use]
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the total element count
    #[must_use]
    pub fn with_total_elements(mut self, total_elements: u64) -> Self {
        self.total_elements = Some(total_elements);
        self
    }

    /// Set the explicit has-next flag
    #[must_use]
    pub fn with_has_next(mut self, has_next: bool) -> Self {
        self.has_next = Some(has_next);
        self
    }

    /// Total number of pages on the server, if it can be computed
    pub fn total_pages(&self) -> Option<u64> {
        match (self.total_elements, self.page_size) {
            (Some(total), Some(size)) if size > 0 => Some(total.div_ceil(u64::from(size))),
            _ => None,
        }
    }

    /// Whether more pages exist after this one
    ///
    /// An explicit `has_next` wins. Otherwise the answer is computed from the
    /// page number and total pages; `None` when that is not possible.
    pub fn has_more_pages(&self) -> Option<bool> {
        if let Some(has_next) = self.has_next {
            return Some(has_next);
        }
        let page_number = u64::from(self.page_number?);
        let total_pages = self.total_pages()?;
        Some(page_number + 1 < total_pages)
    }
}

impl NumberedPage<JsonValue> {
    /// Deserialize every raw item into `U`
    pub fn into_typed<U: Model>(self) -> Result<NumberedPage<U>> {
        Ok(NumberedPage {
            items: decode_items(self.items)?,
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            has_next: self.has_next,
        })
    }
}

impl<T: Model> NumberedPage<T> {
    /// Build a page from a response body, decoding items through `T`
    pub fn from_value(raw: JsonValue) -> Result<Self> {
        let page: NumberedPage<JsonValue> = serde_json::from_value(raw)?;
        page.into_typed()
    }

    /// Serialize the page; `remove_nones` strips `null` fields from the items
    pub fn to_value(&self, remove_nones: bool) -> Result<JsonValue> {
        let mut value = serde_json::to_value(self)?;
        if remove_nones {
            strip_item_nulls(&mut value);
        }
        Ok(value)
    }
}

impl<T> Page for NumberedPage<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

// ============================================================================
// Cursor Page
// ============================================================================

/// Metadata block of a cursor page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Opaque continuation token; empty or absent on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Any other metadata the server sent
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl ResponseMetadata {
    /// Metadata pointing at the given cursor
    pub fn with_cursor(cursor: impl Into<String>) -> Self {
        Self {
            next_cursor: Some(cursor.into()),
            extra: JsonObject::new(),
        }
    }
}

/// A page from an endpoint using cursor pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct CursorPage<T> {
    #[serde(default = "Vec::new", deserialize_with = "deserialize_items")]
    pub items: Vec<T>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

impl<T> Default for CursorPage<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> CursorPage<T> {
    /// Create a terminal page holding only items
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            response_metadata: None,
        }
    }

    /// Set the cursor of the next page
    #[must_use]
    pub fn with_next_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.response_metadata
            .get_or_insert_with(ResponseMetadata::default)
            .next_cursor = Some(cursor.into());
        self
    }

    /// Cursor of the next page, `None` on the last page
    ///
    /// Only absence and the empty string end pagination; the cursor itself is
    /// never interpreted.
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .and_then(|meta| meta.next_cursor.as_deref())
            .filter(|cursor| !cursor.is_empty())
    }
}

impl CursorPage<JsonValue> {
    /// Deserialize every raw item into `U`
    pub fn into_typed<U: Model>(self) -> Result<CursorPage<U>> {
        Ok(CursorPage {
            items: decode_items(self.items)?,
            response_metadata: self.response_metadata,
        })
    }
}

impl<T: Model> CursorPage<T> {
    /// Build a page from a response body, decoding items through `T`
    pub fn from_value(raw: JsonValue) -> Result<Self> {
        let page: CursorPage<JsonValue> = serde_json::from_value(raw)?;
        page.into_typed()
    }

    /// Serialize the page; `remove_nones` strips `null` fields from the items
    pub fn to_value(&self, remove_nones: bool) -> Result<JsonValue> {
        let mut value = serde_json::to_value(self)?;
        if remove_nones {
            strip_item_nulls(&mut value);
        }
        Ok(value)
    }
}

impl<T> Page for CursorPage<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `items: null` decodes as an empty page
fn deserialize_items<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn decode_items<U: Model>(raw: Vec<JsonValue>) -> Result<Vec<U>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            U::from_value(item).map_err(|e| {
                Error::decode(format!(
                    "item {index} is not a valid {}: {e}",
                    std::any::type_name::<U>()
                ))
            })
        })
        .collect()
}

fn strip_item_nulls(page: &mut JsonValue) {
    if let Some(items) = page.get_mut("items") {
        strip_nulls(items);
    }
}
