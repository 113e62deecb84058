//! Feed rendering: content items in, one RSS 2.0 document out.
//!
//! This module provides the rendering pipeline:
//!
//! - **Items**: The [`ContentItem`] capability trait and the per-item `<item>` writer
//! - **Channel**: Header, visibility filtering, and footer around the items
//! - **Source**: A JSON-backed [`Item`] for feeding the pipeline from files
//!
//! # Architecture
//!
//! - [`item`] - Field lookup, title/date/description extraction, `<item>` serialization
//! - [`channel`] - [`FeedRenderer`] building the whole document with `quick-xml`
//! - [`source`] - Loading ordered items from a JSON array
//!
//! # Example
//!
//! ```
//! use syndicate::config::FeedConfig;
//! use syndicate::feed::{render_feed, Item};
//!
//! let config = FeedConfig::merge([("title", "Example"), ("item_description_max_length", "40")])?;
//! let items = vec![Item::new("https://example.com/1")
//!     .with_field("title", "First")
//!     .with_field("body", "<p>Short body.</p>")
//!     .with_field("created", 1_700_000_000)];
//!
//! let xml = render_feed(&items, &config, "https://example.com/")?;
//! assert!(xml.contains("<![CDATA[Short body.]]>"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod channel;
pub mod item;
pub mod source;

pub use channel::{render_feed, FeedRenderer};
pub use item::{render_item, write_item, ContentItem, FieldValue, RenderError};
pub use source::{load_items, parse_items, Item, SourceError};
