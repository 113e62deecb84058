//! Render RSS 2.0 feeds from ordered content items.
//!
//! - [`config`] - Feed metadata and item field mappings, merged over defaults
//! - [`feed`] - The rendering pipeline and the [`feed::ContentItem`] trait
//! - [`util`] - Text truncation, tag stripping, CDATA helpers, atomic writes

pub mod config;
pub mod feed;
pub mod util;
