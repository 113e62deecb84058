use std::borrow::Cow;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::feed::{ContentItem, FieldValue};

/// SEC-014: Maximum items file size (16 MB).
const MAX_ITEMS_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Errors that can occur while loading items from JSON.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File I/O error.
    #[error("Failed to read items file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a JSON array of item objects.
    #[error("Invalid items JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// SEC-014: Items file exceeds maximum allowed size.
    #[error("Items file too large: {0}")]
    TooLarge(String),
}

/// A content item backed by a JSON object.
///
/// `url` and `visible` are reserved keys; every other key becomes a named
/// field. Numbers read as timestamps through [`ContentItem::raw_field`] and as
/// decimal text through [`ContentItem::field`].
///
/// ```json
/// { "url": "https://example.com/a", "title": "A", "body": "<p>..</p>", "created": 1700000000 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    pub url: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn default_visible() -> bool {
    true
}

impl Item {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            visible: true,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Marks the item as not visible to the current viewer.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl ContentItem for Item {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match self.fields.get(name) {
            Some(Value::String(s)) => FieldValue::Text(Cow::Borrowed(s.as_str())),
            Some(Value::Number(n)) => FieldValue::Text(Cow::Owned(n.to_string())),
            Some(Value::Bool(b)) => FieldValue::Text(Cow::Owned(b.to_string())),
            // Nested values have no display form
            Some(Value::Array(_) | Value::Object(_) | Value::Null) | None => FieldValue::Absent,
        }
    }

    fn raw_field(&self, name: &str) -> FieldValue<'_> {
        match self.fields.get(name) {
            Some(Value::Number(n)) => n
                .as_i64()
                .map_or(FieldValue::Absent, FieldValue::Timestamp),
            _ => self.field(name),
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Loads items from a JSON file containing an array of item objects.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file exceeds 16 MB
/// - The content is not a JSON array of objects with a `url` string
pub async fn load_items(path: &Path) -> Result<Vec<Item>, SourceError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > MAX_ITEMS_FILE_SIZE {
        return Err(SourceError::TooLarge(format!(
            "Items file is {} bytes (max {} bytes)",
            meta.len(),
            MAX_ITEMS_FILE_SIZE
        )));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let items = parse_items(&content)?;
    tracing::info!(path = %path.display(), count = items.len(), "Loaded items");
    Ok(items)
}

/// Parses a JSON array of item objects, preserving order.
pub fn parse_items(content: &str) -> Result<Vec<Item>, SourceError> {
    Ok(serde_json::from_str(content)?)
}
