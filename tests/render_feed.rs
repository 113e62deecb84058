//! Integration tests for the rendering pipeline: config, items, whole documents.
//!
//! Every test pins the channel pubDate so output is reproducible. Rendered
//! documents are re-read with `quick-xml` for well-formedness and with
//! `feed-rs` to confirm real feed readers accept them.

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;
use syndicate::config::FeedConfig;
use syndicate::feed::{parse_items, render_feed, render_item, FeedRenderer, Item};

fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn test_item(slug: &str, title: &str) -> Item {
    Item::new(format!("https://example.com/posts/{slug}"))
        .with_field("title", title)
        .with_field("body", format!("Body of {title}. More words follow here."))
        .with_field("created", 1_699_990_000)
}

fn render(config: &FeedConfig, items: &[Item]) -> String {
    FeedRenderer::new(config)
        .fallback_url("https://example.com/")
        .published_at(fixed_time())
        .render(items)
        .unwrap()
}

/// Reads the whole document, returning the text of every CDATA run joined
/// per item `<description>`. The channel description is skipped.
fn parse_descriptions(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut descriptions = Vec::new();
    let mut in_item = false;
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => in_item = true,
                b"description" if in_item => current = Some(String::new()),
                _ => {}
            },
            Ok(Event::CData(e)) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(std::str::from_utf8(&e).unwrap());
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => in_item = false,
                b"description" => {
                    if let Some(text) = current.take() {
                        descriptions.push(text);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => panic!("rendered feed is not well-formed: {e}\n{xml}"),
            _ => {}
        }
    }

    descriptions
}

// ============================================================================
// Whole-document behavior
// ============================================================================

#[test]
fn test_feed_parses_as_rss() {
    let config = FeedConfig::merge([
        ("title", "Example Posts"),
        ("url", "https://example.com/posts"),
        ("description", "All the posts"),
        ("ttl", "60"),
    ])
    .unwrap();
    let items = vec![test_item("one", "One"), test_item("two", "Two")];

    let xml = render(&config, &items);
    let feed = feed_rs::parser::parse(xml.as_bytes()).expect("feed-rs rejected rendered feed");

    assert_eq!(feed.title.map(|t| t.content).as_deref(), Some("Example Posts"));
    assert_eq!(feed.entries.len(), 2);
    assert_eq!(
        feed.entries[0].title.as_ref().map(|t| t.content.as_str()),
        Some("One")
    );
    assert_eq!(
        feed.entries[1].links.first().map(|l| l.href.as_str()),
        Some("https://example.com/posts/two")
    );
    assert_eq!(
        feed.entries[0].published.map(|d| d.timestamp()),
        Some(1_699_990_000)
    );
}

#[test]
fn test_items_keep_input_order() {
    let config = FeedConfig::default();
    let items: Vec<Item> = ["c", "a", "b"]
        .iter()
        .map(|slug| test_item(slug, &slug.to_uppercase()))
        .collect();

    let xml = render(&config, &items);
    let positions: Vec<usize> = ["/posts/c<", "/posts/a<", "/posts/b<"]
        .iter()
        .map(|needle| xml.find(needle).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_empty_title_item_is_omitted() {
    let config = FeedConfig::default();
    let items = vec![test_item("kept", "Kept"), test_item("dropped", "<em></em>")];

    let xml = render(&config, &items);
    assert_eq!(xml.matches("<item>").count(), 1);
    assert!(!xml.contains("/posts/dropped"));
    assert_eq!(render_item(&items[1], &config).unwrap(), "");
}

#[test]
fn test_ttl_zero_has_no_ttl_element() {
    let config = FeedConfig::merge([("ttl", "0")]).unwrap();
    let xml = render(&config, &[]);
    assert!(!xml.contains("<ttl>"));
}

#[test]
fn test_one_visible_one_hidden() {
    let config = FeedConfig::default();
    let items = vec![test_item("public", "Public"), test_item("private", "Private").hidden()];

    let xml = render(&config, &items);
    assert_eq!(xml.matches("<item>").count(), 1);
    assert!(xml.contains("<title>Public</title>"));
    assert!(!xml.contains("Private"));
}

#[test]
fn test_fallback_url_fills_channel_link() {
    let config = FeedConfig::default();
    let xml = render(&config, &[]);
    assert!(xml.contains("<link>https://example.com/</link>"));
}

#[test]
fn test_rendering_is_deterministic_for_fixed_time() {
    let config = FeedConfig::merge([("item_description_max_length", "25")]).unwrap();
    let items = vec![test_item("one", "One"), test_item("two", "Two")];
    assert_eq!(render(&config, &items), render(&config, &items));
}

#[test]
fn test_render_feed_uses_current_time() {
    let config = FeedConfig::default();
    let before = Utc::now().timestamp();
    let xml = render_feed(&Vec::<Item>::new(), &config, "https://example.com/").unwrap();

    let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
    let published = feed.published.expect("channel pubDate missing").timestamp();
    assert!(published >= before - 1);
}

// ============================================================================
// Descriptions
// ============================================================================

#[test]
fn test_descriptions_truncated_at_boundary() {
    let config = FeedConfig::merge([("item_description_max_length", "20")]).unwrap();
    let items = vec![Item::new("https://example.com/1")
        .with_field("title", "Scenario")
        .with_field(
            "body",
            "<p>Hello world. This is a test sentence that goes on.</p>",
        )];

    let xml = render(&config, &items);
    assert_eq!(parse_descriptions(&xml), vec!["Hello world.".to_string()]);
}

#[test]
fn test_cdata_terminator_survives_round_trip() {
    let config = FeedConfig::default();
    let body = "if (a[b[0]]>1) { x = \"]]>\"; }";
    let items = vec![Item::new("https://example.com/code")
        .with_field("title", "Code sample")
        .with_field("body", body)];

    let xml = render(&config, &items);
    assert_eq!(parse_descriptions(&xml), vec![body.to_string()]);
}

#[test]
fn test_markup_kept_when_max_length_zero() {
    let config = FeedConfig::default();
    let items = vec![Item::new("https://example.com/html")
        .with_field("title", "Markup")
        .with_field("body", "<p>Rich <a href=\"/x?a=1&b=2\">content</a></p>")];

    let xml = render(&config, &items);
    assert_eq!(
        parse_descriptions(&xml),
        vec!["<p>Rich <a href=\"/x?a=1&b=2\">content</a></p>".to_string()]
    );
}

// ============================================================================
// JSON items end to end
// ============================================================================

#[test]
fn test_json_items_to_feed() {
    let config = FeedConfig::from_toml_str(
        r#"
[feed]
title = "From JSON"
item_title_field = "headline"
item_description_field = "summary"
item_date_field = "published"
item_description_max_length = 30
"#,
    )
    .unwrap();

    let items = parse_items(
        r#"[
        {"url": "https://example.com/a", "headline": "Alpha", "summary": "Short summary.", "published": 1699990000},
        {"url": "https://example.com/b", "headline": "Beta", "visible": false},
        {"url": "https://example.com/c", "headline": "", "summary": "No title, no item"},
        {"url": "https://example.com/d", "headline": "Delta", "published": "2023-11-14T00:00:00Z"}
    ]"#,
    )
    .unwrap();

    let xml = render(&config, &items);
    let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();

    let titles: Vec<_> = feed
        .entries
        .iter()
        .filter_map(|e| e.title.as_ref().map(|t| t.content.clone()))
        .collect();
    assert_eq!(titles, vec!["Alpha".to_string(), "Delta".to_string()]);
    assert_eq!(
        parse_descriptions(&xml),
        vec!["Short summary.".to_string(), String::new()]
    );
    assert!(feed.entries.iter().all(|e| e.published.is_some()));
}
