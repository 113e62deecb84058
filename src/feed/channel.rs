use std::io::Cursor;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesPI, BytesStart, Event};
use quick_xml::Writer;

use crate::config::FeedConfig;
use crate::feed::item::{write_end, write_item, write_start, write_text_element};
use crate::feed::{ContentItem, RenderError};
use crate::util::escape_text;

/// Renders a complete RSS 2.0 document from a [`FeedConfig`] and items.
///
/// The two environmental inputs, the fallback channel link and the channel
/// `pubDate`, are supplied through the builder so rendering stays a pure
/// function of its arguments.
///
/// # Examples
///
/// ```
/// use syndicate::config::FeedConfig;
/// use syndicate::feed::{FeedRenderer, Item};
///
/// let config = FeedConfig::merge([("title", "Changelog")]).unwrap();
/// let items: Vec<Item> = Vec::new();
///
/// let xml = FeedRenderer::new(&config)
///     .fallback_url("https://example.com/changelog")
///     .render(&items)
///     .unwrap();
/// assert!(xml.contains("<link>https://example.com/changelog</link>"));
/// ```
#[derive(Debug, Clone)]
pub struct FeedRenderer<'a> {
    config: &'a FeedConfig,
    fallback_url: &'a str,
    published_at: Option<DateTime<Utc>>,
}

impl<'a> FeedRenderer<'a> {
    pub fn new(config: &'a FeedConfig) -> Self {
        Self {
            config,
            fallback_url: "",
            published_at: None,
        }
    }

    /// Channel link to use when the config leaves `url` empty.
    pub fn fallback_url(mut self, url: &'a str) -> Self {
        self.fallback_url = url;
        self
    }

    /// Fixes the channel `pubDate`; defaults to the time of rendering.
    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// The channel link after fallback resolution.
    pub fn channel_link(&self) -> &'a str {
        if self.config.url().is_empty() {
            self.fallback_url
        } else {
            self.config.url()
        }
    }

    /// Renders header, visible items in order, and footer into one string.
    ///
    /// Items whose visibility check fails are skipped, as are items with an
    /// empty title. Nothing is returned until the whole document is built.
    pub fn render<'i, I, T>(&self, items: I) -> Result<String, RenderError>
    where
        I: IntoIterator<Item = &'i T>,
        T: ContentItem + ?Sized + 'i,
    {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        self.write_header(&mut writer)?;

        let (mut rendered, mut hidden, mut untitled) = (0usize, 0usize, 0usize);
        for item in items {
            if !item.is_visible() {
                hidden += 1;
                continue;
            }
            if write_item(&mut writer, item, self.config)? {
                rendered += 1;
            } else {
                untitled += 1;
            }
        }

        // </channel></rss>
        write_end(&mut writer, "channel")?;
        write_end(&mut writer, "rss")?;

        tracing::debug!(rendered, hidden, untitled, "Rendered feed");

        let bytes = writer.into_inner().into_inner();
        Ok(String::from_utf8(bytes)?)
    }

    fn write_header<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), RenderError> {
        let config = self.config;

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| RenderError::Xml(format!("XML declaration: {e}")))?;

        for (kind, href) in [
            ("text/xsl", config.xsl_stylesheet_url()),
            ("text/css", config.css_stylesheet_url()),
        ] {
            if href.is_empty() {
                continue;
            }
            let content = format!(
                "xml-stylesheet type=\"{kind}\" href=\"{}\"",
                escape_text(href)
            );
            writer
                .write_event(Event::PI(BytesPI::new(content)))
                .map_err(|e| RenderError::Xml(format!("{kind} stylesheet: {e}")))?;
        }

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer
            .write_event(Event::Start(rss))
            .map_err(|e| RenderError::Xml(format!("<rss>: {e}")))?;
        write_start(writer, "channel")?;

        let published = self.published_at.unwrap_or_else(Utc::now);
        write_text_element(writer, "title", config.title())?;
        write_text_element(writer, "link", self.channel_link())?;
        write_text_element(writer, "description", config.description())?;
        write_text_element(writer, "pubDate", &published.to_rfc2822())?;

        if !config.copyright().is_empty() {
            write_text_element(writer, "copyright", config.copyright())?;
        }
        if config.ttl() > 0 {
            write_text_element(writer, "ttl", &config.ttl().to_string())?;
        }

        Ok(())
    }
}

/// Renders a feed stamped with the current time.
///
/// Shorthand for [`FeedRenderer`] with `fallback_url` as the channel link when
/// the config has none.
pub fn render_feed<'i, I, T>(
    items: I,
    config: &FeedConfig,
    fallback_url: &str,
) -> Result<String, RenderError>
where
    I: IntoIterator<Item = &'i T>,
    T: ContentItem + ?Sized + 'i,
{
    FeedRenderer::new(config)
        .fallback_url(fallback_url)
        .render(items)
}
