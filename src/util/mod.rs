//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **Text processing**: Markup stripping and boundary-aware truncation
//! - **XML helpers**: CDATA wrapping that survives embedded terminators
//! - **File output**: Atomic writes for generated feeds
//!
//! # Examples
//!
//! ```
//! use syndicate::util::{strip_tags, truncate_at_boundary, wrap_cdata};
//!
//! let plain = strip_tags("<p>Release notes</p>");
//! let summary = truncate_at_boundary("First point. Second point follows here.", 16);
//! let body = wrap_cdata(&summary);
//! ```

mod fs;
mod text;
mod xml;

pub use fs::write_atomic;
pub use text::{strip_tags, truncate_at_boundary, BOUNDARY_MARKERS};
pub use xml::{cdata_sections, escape_text, wrap_cdata};
