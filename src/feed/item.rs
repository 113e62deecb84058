use std::borrow::Cow;
use std::io::Cursor;

use chrono::{DateTime, Datelike, Utc};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::config::FeedConfig;
use crate::util::{cdata_sections, strip_tags, truncate_at_boundary};

/// Errors that can occur while serializing a feed.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The XML writer rejected an event.
    #[error("Failed to write {0}")]
    Xml(String),

    /// The generated document was not valid UTF-8.
    #[error("Generated feed contains invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A value looked up on a content item by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    /// Unix timestamp in seconds.
    Timestamp(i64),
    Absent,
}

impl FieldValue<'_> {
    /// Text form of the value; timestamps render as their decimal seconds.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Timestamp(ts) => Cow::Owned(ts.to_string()),
            FieldValue::Absent => Cow::Borrowed(""),
        }
    }

    /// Interprets the value as a point in time.
    ///
    /// Accepts Unix seconds (as a timestamp or numeric text), RFC 3339 and
    /// RFC 2822. Zero, blank and unparseable values yield `None`, as do
    /// dates outside years 0..=9999, which RFC 2822 cannot express.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.parse_datetime()
            .filter(|dt| (0..=9999).contains(&dt.year()))
    }

    fn parse_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(0) | FieldValue::Absent => None,
            FieldValue::Timestamp(ts) => DateTime::from_timestamp(*ts, 0),
            FieldValue::Text(s) => {
                let s = s.trim();
                if let Ok(ts) = s.parse::<i64>() {
                    return FieldValue::Timestamp(ts).parse_datetime();
                }
                DateTime::parse_from_rfc3339(s)
                    .or_else(|_| DateTime::parse_from_rfc2822(s))
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }
}

/// Read-only view of one content record.
///
/// The renderer never mutates items; implementors decide how field names map
/// to their own storage and who may see the item.
pub trait ContentItem {
    /// Display value of the named field.
    fn field(&self, name: &str) -> FieldValue<'_>;

    /// Unformatted value of the named field, used for dates.
    fn raw_field(&self, name: &str) -> FieldValue<'_> {
        self.field(name)
    }

    /// Canonical permalink, used for both `<link>` and `<guid>`.
    fn url(&self) -> &str;

    /// Whether the current viewer may see this item.
    fn is_visible(&self) -> bool {
        true
    }
}

/// Renders one `<item>` fragment.
///
/// Returns an empty string when the title is empty after stripping tags; such
/// items are left out of the feed entirely.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use syndicate::config::FeedConfig;
/// use syndicate::feed::{render_item, ContentItem, FieldValue};
///
/// struct Note;
///
/// impl ContentItem for Note {
///     fn field(&self, name: &str) -> FieldValue<'_> {
///         match name {
///             "title" => FieldValue::Text(Cow::Borrowed("Hello")),
///             _ => FieldValue::Absent,
///         }
///     }
///     fn url(&self) -> &str {
///         "https://example.com/hello"
///     }
/// }
///
/// let xml = render_item(&Note, &FeedConfig::default()).unwrap();
/// assert!(xml.contains("<title>Hello</title>"));
/// assert!(xml.contains("<guid>https://example.com/hello</guid>"));
/// ```
pub fn render_item<T>(item: &T, config: &FeedConfig) -> Result<String, RenderError>
where
    T: ContentItem + ?Sized,
{
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_item(&mut writer, item, config)?;
    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

/// Writes one `<item>` into `writer`.
///
/// Returns `Ok(false)` without writing anything when the item has no title.
pub fn write_item<W, T>(
    writer: &mut Writer<W>,
    item: &T,
    config: &FeedConfig,
) -> Result<bool, RenderError>
where
    W: std::io::Write,
    T: ContentItem + ?Sized,
{
    let title_value = item.field(config.item_title_field());
    let title_text = title_value.as_text();
    let title = strip_tags(&title_text);
    if title.is_empty() {
        tracing::debug!(
            url = %item.url(),
            field = %config.item_title_field(),
            "Skipping item without title"
        );
        return Ok(false);
    }

    let pub_date = item.raw_field(config.item_date_field()).as_datetime();
    if pub_date.is_none() {
        tracing::debug!(
            url = %item.url(),
            field = %config.item_date_field(),
            "No usable date, omitting pubDate"
        );
    }

    let description_value = item.field(config.item_description_field());
    let description_text = description_value.as_text();
    let description =
        truncate_at_boundary(description_text.trim(), config.item_description_max_length());

    write_start(writer, "item")?;
    write_text_element(writer, "title", &title)?;

    write_start(writer, "description")?;
    for section in cdata_sections(&description) {
        writer
            .write_event(Event::CData(BytesCData::new(section)))
            .map_err(|e| RenderError::Xml(format!("description: {e}")))?;
    }
    write_end(writer, "description")?;

    if let Some(date) = pub_date {
        write_text_element(writer, "pubDate", &date.to_rfc2822())?;
    }
    write_text_element(writer, "link", item.url())?;
    write_text_element(writer, "guid", item.url())?;
    write_end(writer, "item")?;

    Ok(true)
}

pub(crate) fn write_start<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
) -> Result<(), RenderError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| RenderError::Xml(format!("<{name}>: {e}")))
}

pub(crate) fn write_end<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
) -> Result<(), RenderError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| RenderError::Xml(format!("</{name}>: {e}")))
}

/// Writes `<name>text</name>` with `text` escaped.
pub(crate) fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), RenderError> {
    write_start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| RenderError::Xml(format!("{name} text: {e}")))?;
    write_end(writer, name)
}
