//! RSS feeds: the `<rss>` family (0.91, 0.92, 2.0) and the RDF family
//! (0.9, 1.0).
//!
//! The `<rss>` family nests items inside `<channel>`; each version only
//! reads the item elements it defined. The RDF family places `<channel>`,
//! `<image>`, `<textinput>` and `<item>` side by side under `<rdf:RDF>`,
//! all in the version's own namespace.

use super::{expect_root, ns, parse_date, parse_url, parse_url_with_base, VariantError};
use crate::config::LoadSettings;
use crate::xml::nav::{attr, child, child_text, children, text};
use crate::xml::{collect_extensions, ExtensionElement};
use chrono::{DateTime, FixedOffset};
use roxmltree::Node;
use serde::Serialize;
use url::Url;

// ============================================================================
// Document Model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssFeed {
    pub channel: RssChannel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssChannel {
    pub title: String,
    pub link: Option<Url>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub managing_editor: Option<String>,
    pub web_master: Option<String>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub last_build_date: Option<DateTime<FixedOffset>>,
    pub categories: Vec<RssCategory>,
    pub generator: Option<String>,
    pub docs: Option<Url>,
    /// Minutes a channel may be cached (2.0 only).
    pub ttl: Option<u32>,
    /// PICS rating (0.91 only).
    pub rating: Option<String>,
    pub image: Option<RssImage>,
    pub text_input: Option<RssTextInput>,
    pub skip_hours: Vec<u8>,
    pub skip_days: Vec<String>,
    pub items: Vec<RssItem>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssImage {
    pub url: Option<Url>,
    pub title: Option<String>,
    pub link: Option<Url>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssTextInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub link: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssCategory {
    pub domain: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssItem {
    pub title: Option<String>,
    pub link: Option<Url>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<RssCategory>,
    pub comments: Option<Url>,
    pub enclosure: Option<RssEnclosure>,
    pub guid: Option<RssGuid>,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub source: Option<RssSource>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssEnclosure {
    pub url: Option<Url>,
    pub length: Option<u64>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssGuid {
    pub value: String,
    pub is_permalink: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssSource {
    pub url: Option<Url>,
    pub title: Option<String>,
}

// ============================================================================
// <rss> family
// ============================================================================

/// Which generation of the `<rss>` vocabulary to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    V091,
    V092,
    V20,
}

pub fn parse_rss_091(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    parse_channel_feed(root, Level::V091, settings)
}

pub fn parse_rss_092(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    parse_channel_feed(root, Level::V092, settings)
}

pub fn parse_rss_20(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    parse_channel_feed(root, Level::V20, settings)
}

/// Reads an `<rss>` document. Its elements are in no namespace in practice,
/// but they are read in whatever namespace the root is in.
fn parse_channel_feed(
    root: Node<'_, '_>,
    level: Level,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    expect_root(root, "rss")?;
    let rss = root.tag_name().namespace();
    let channel = child(root, rss, "channel").ok_or(VariantError::MissingElement("channel"))?;
    let link = parse_url(child_text(channel, rss, "link"), "channel.link");
    let base = link.as_ref();

    let mut out = RssChannel {
        title: child_text(channel, rss, "title").unwrap_or_default(),
        description: child_text(channel, rss, "description"),
        language: child_text(channel, rss, "language"),
        copyright: child_text(channel, rss, "copyright"),
        managing_editor: child_text(channel, rss, "managingEditor"),
        web_master: child_text(channel, rss, "webMaster"),
        pub_date: child_text(channel, rss, "pubDate").and_then(|v| parse_date(&v)),
        last_build_date: child_text(channel, rss, "lastBuildDate").and_then(|v| parse_date(&v)),
        docs: parse_url(child_text(channel, rss, "docs"), "channel.docs"),
        image: child(channel, rss, "image").map(|n| parse_image(n, rss, base)),
        text_input: child(channel, rss, "textInput").map(|n| parse_text_input(n, rss, base)),
        skip_hours: parse_skip_hours(channel, rss),
        skip_days: child(channel, rss, "skipDays")
            .map(|n| children(n, rss, "day").filter_map(text).collect())
            .unwrap_or_default(),
        extensions: collect_extensions(channel, rss, settings),
        ..Default::default()
    };

    if level == Level::V091 {
        out.rating = child_text(channel, rss, "rating");
    }
    if level >= Level::V092 {
        out.categories = parse_categories(channel, rss);
    }
    if level == Level::V20 {
        out.generator = child_text(channel, rss, "generator");
        out.ttl = child_text(channel, rss, "ttl").and_then(|v| v.parse().ok());
    }

    out.items = children(channel, rss, "item")
        .map(|item| parse_item(item, rss, base, level, settings))
        .collect();
    out.link = link;

    tracing::trace!(items = out.items.len(), ?level, "Parsed RSS channel");
    Ok(RssFeed { channel: out })
}

/// Item URLs may be relative to the channel link, which `base` holds.
fn parse_item(
    item: Node<'_, '_>,
    rss: Option<&str>,
    base: Option<&Url>,
    level: Level,
    settings: &LoadSettings,
) -> RssItem {
    let mut out = RssItem {
        title: child_text(item, rss, "title"),
        link: parse_url_with_base(child_text(item, rss, "link"), base, "item.link"),
        description: child_text(item, rss, "description"),
        extensions: collect_extensions(item, rss, settings),
        ..Default::default()
    };

    if level >= Level::V092 {
        out.categories = parse_categories(item, rss);
        out.enclosure = child(item, rss, "enclosure").map(|n| RssEnclosure {
            url: parse_url_with_base(attr(n, "url"), base, "enclosure.url"),
            length: attr(n, "length").and_then(|v| v.parse().ok()),
            mime_type: attr(n, "type"),
        });
        out.source = child(item, rss, "source").map(|n| RssSource {
            url: parse_url(attr(n, "url"), "source.url"),
            title: text(n),
        });
    }

    if level == Level::V20 {
        out.author = child_text(item, rss, "author");
        out.comments =
            parse_url_with_base(child_text(item, rss, "comments"), base, "item.comments");
        out.pub_date = child_text(item, rss, "pubDate").and_then(|v| parse_date(&v));
        out.guid = child(item, rss, "guid").and_then(|n| {
            Some(RssGuid {
                value: text(n)?,
                // Absent isPermaLink means true
                is_permalink: !n
                    .attribute("isPermaLink")
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("false")),
            })
        });
    }

    out
}

fn parse_categories(node: Node<'_, '_>, rss: Option<&str>) -> Vec<RssCategory> {
    children(node, rss, "category")
        .filter_map(|n| {
            Some(RssCategory {
                domain: attr(n, "domain"),
                value: text(n)?,
            })
        })
        .collect()
}

fn parse_skip_hours(channel: Node<'_, '_>, rss: Option<&str>) -> Vec<u8> {
    child(channel, rss, "skipHours")
        .map(|n| {
            children(n, rss, "hour")
                .filter_map(text)
                .filter_map(|h| h.parse::<u8>().ok())
                .filter(|h| *h < 24)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_image(node: Node<'_, '_>, ns: Option<&str>, base: Option<&Url>) -> RssImage {
    RssImage {
        url: parse_url_with_base(child_text(node, ns, "url"), base, "image.url"),
        title: child_text(node, ns, "title"),
        link: parse_url_with_base(child_text(node, ns, "link"), base, "image.link"),
        width: child_text(node, ns, "width").and_then(|v| v.parse().ok()),
        height: child_text(node, ns, "height").and_then(|v| v.parse().ok()),
        description: child_text(node, ns, "description"),
    }
}

fn parse_text_input(node: Node<'_, '_>, ns: Option<&str>, base: Option<&Url>) -> RssTextInput {
    RssTextInput {
        title: child_text(node, ns, "title"),
        description: child_text(node, ns, "description"),
        name: child_text(node, ns, "name"),
        link: parse_url_with_base(child_text(node, ns, "link"), base, "textInput.link"),
    }
}

// ============================================================================
// RDF family
// ============================================================================

pub fn parse_rss_090(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    parse_rdf_feed(root, ns::RSS_090, settings)
}

pub fn parse_rss_10(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    parse_rdf_feed(root, ns::RSS_10, settings)
}

fn parse_rdf_feed(
    root: Node<'_, '_>,
    rss_ns: &'static str,
    settings: &LoadSettings,
) -> Result<RssFeed, VariantError> {
    expect_root(root, "RDF")?;
    let rss = Some(rss_ns);
    let dc = Some(ns::DUBLIN_CORE);
    let channel = child(root, rss, "channel").ok_or(VariantError::MissingElement("channel"))?;

    let link = parse_url(child_text(channel, rss, "link"), "channel.link");
    let base = link.as_ref();

    let mut out = RssChannel {
        title: child_text(channel, rss, "title").unwrap_or_default(),
        description: child_text(channel, rss, "description"),
        pub_date: child_text(channel, dc, "date").and_then(|v| parse_date(&v)),
        language: child_text(channel, dc, "language"),
        copyright: child_text(channel, dc, "rights"),
        image: child(root, rss, "image").map(|n| parse_image(n, rss, base)),
        text_input: child(root, rss, "textinput").map(|n| parse_text_input(n, rss, base)),
        items: children(root, rss, "item")
            .map(|item| parse_rdf_item(item, rss, base, settings))
            .collect(),
        extensions: collect_extensions(channel, rss, settings),
        ..Default::default()
    };
    out.link = link;

    Ok(RssFeed { channel: out })
}

fn parse_rdf_item(
    item: Node<'_, '_>,
    rss: Option<&str>,
    base: Option<&Url>,
    settings: &LoadSettings,
) -> RssItem {
    let dc = Some(ns::DUBLIN_CORE);
    // rdf:about is the item's URI identifier
    let about = item
        .attribute((ns::RDF, "about"))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    RssItem {
        title: child_text(item, rss, "title"),
        link: parse_url_with_base(child_text(item, rss, "link"), base, "item.link"),
        description: child_text(item, rss, "description"),
        author: child_text(item, dc, "creator"),
        pub_date: child_text(item, dc, "date").and_then(|v| parse_date(&v)),
        guid: about.map(|value| RssGuid {
            value: value.to_string(),
            is_permalink: false,
        }),
        extensions: collect_extensions(item, rss, settings),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn settings() -> LoadSettings {
        LoadSettings::default()
    }

    const RSS_20: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Liftoff News</title>
    <link>http://liftoff.msfc.nasa.gov/</link>
    <description>Liftoff to Space Exploration.</description>
    <language>en-us</language>
    <pubDate>Tue, 10 Jun 2003 04:00:00 GMT</pubDate>
    <generator>Weblog Editor 2.0</generator>
    <ttl>60</ttl>
    <category domain="http://www.dmoz.org">Science</category>
    <skipHours><hour>0</hour><hour>25</hour><hour>7</hour></skipHours>
    <item>
      <title>Star City</title>
      <link>http://liftoff.msfc.nasa.gov/news/2003/news-starcity.asp</link>
      <description>How do Americans get ready to work with Russians?</description>
      <author>editor@example.com</author>
      <enclosure url="http://example.com/a.mp3" length="12216320" type="audio/mpeg"/>
      <guid isPermaLink="false">starcity-0001</guid>
      <pubDate>Tue, 03 Jun 2003 09:39:21 GMT</pubDate>
      <dc:creator>Jane</dc:creator>
    </item>
    <item>
      <description>An item with only a description.</description>
      <guid>http://liftoff.msfc.nasa.gov/2003/05/30.html#item572</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_rss_20_channel_and_items() {
        let doc = Document::parse(RSS_20).unwrap();
        let feed = parse_rss_20(doc.root_element(), &settings()).unwrap();
        let channel = &feed.channel;

        assert_eq!(channel.title, "Liftoff News");
        assert_eq!(
            channel.link.as_ref().map(Url::as_str),
            Some("http://liftoff.msfc.nasa.gov/")
        );
        assert_eq!(channel.ttl, Some(60));
        assert_eq!(channel.generator.as_deref(), Some("Weblog Editor 2.0"));
        assert_eq!(channel.categories.len(), 1);
        assert_eq!(channel.skip_hours, vec![0, 7]);
        assert_eq!(channel.items.len(), 2);

        let first = &channel.items[0];
        assert_eq!(first.title.as_deref(), Some("Star City"));
        assert_eq!(first.author.as_deref(), Some("editor@example.com"));
        assert_eq!(first.enclosure.as_ref().and_then(|e| e.length), Some(12_216_320));
        let guid = first.guid.as_ref().unwrap();
        assert_eq!(guid.value, "starcity-0001");
        assert!(!guid.is_permalink);
        assert!(first.pub_date.is_some());
        assert_eq!(first.extensions.len(), 1);
        assert_eq!(first.extensions[0].name, "creator");

        let second = &channel.items[1];
        assert!(second.title.is_none());
        assert!(second.guid.as_ref().unwrap().is_permalink);
    }

    #[test]
    fn test_rss_091_ignores_later_elements() {
        let xml = r#"<rss version="0.91"><channel>
            <title>Old</title>
            <rating>(PICS-1.1 "http://www.rsac.org/ratingsv01.html" l gen true)</rating>
            <ttl>60</ttl>
            <item><title>A</title><guid>ignored</guid><category>ignored</category></item>
        </channel></rss>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_rss_091(doc.root_element(), &settings()).unwrap();

        assert!(feed.channel.rating.is_some());
        assert_eq!(feed.channel.ttl, None);
        assert_eq!(feed.channel.items[0].guid, None);
        assert!(feed.channel.items[0].categories.is_empty());
    }

    #[test]
    fn test_rss_092_reads_enclosure_but_not_guid() {
        let xml = r#"<rss version="0.92"><channel><title>T</title>
            <item><enclosure url="http://example.com/x.mp3" length="10" type="audio/mpeg"/>
                  <source url="http://example.com/rss">Origin</source><guid>nope</guid></item>
        </channel></rss>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_rss_092(doc.root_element(), &settings()).unwrap();
        let item = &feed.channel.items[0];

        assert!(item.enclosure.is_some());
        assert_eq!(
            item.source.as_ref().and_then(|s| s.title.as_deref()),
            Some("Origin")
        );
        assert!(item.guid.is_none());
    }

    #[test]
    fn test_missing_channel_is_error() {
        let doc = Document::parse(r#"<rss version="2.0"/>"#).unwrap();
        let err = parse_rss_20(doc.root_element(), &settings()).unwrap_err();
        assert!(matches!(err, VariantError::MissingElement("channel")));
    }

    #[test]
    fn test_item_urls_resolve_against_channel_link() {
        let xml = r#"<rss version="2.0"><channel>
            <title>Relative</title>
            <link>https://example.com/news/</link>
            <image><url>/logo.png</url><title>Relative</title><link>./</link></image>
            <item>
              <link>2024/launch.html</link>
              <comments>2024/launch.html#comments</comments>
              <enclosure url="media/launch.mp3" length="10" type="audio/mpeg"/>
            </item>
        </channel></rss>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_rss_20(doc.root_element(), &settings()).unwrap();
        let channel = &feed.channel;
        let item = &channel.items[0];

        let url = |u: &Option<Url>| u.as_ref().map(Url::as_str).map(str::to_string);
        let image = channel.image.as_ref().unwrap();
        assert_eq!(url(&image.url).as_deref(), Some("https://example.com/logo.png"));
        assert_eq!(url(&item.link).as_deref(), Some("https://example.com/news/2024/launch.html"));
        assert_eq!(
            url(&item.comments).as_deref(),
            Some("https://example.com/news/2024/launch.html#comments")
        );
        let enclosure = item.enclosure.as_ref().unwrap();
        assert_eq!(
            url(&enclosure.url).as_deref(),
            Some("https://example.com/news/media/launch.mp3")
        );
    }

    #[test]
    fn test_rss_in_a_namespace_reads_that_namespace() {
        let xml = r#"<rss xmlns="urn:example:rss" version="2.0"><channel>
            <title>Namespaced</title>
            <item><title>A</title></item>
        </channel></rss>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_rss_20(doc.root_element(), &settings()).unwrap();
        assert_eq!(feed.channel.title, "Namespaced");
        assert_eq!(feed.channel.items[0].title.as_deref(), Some("A"));
        assert!(feed.channel.extensions.is_empty());
    }

    #[test]
    fn test_rss_10_rdf_siblings() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns="http://purl.org/rss/1.0/"
                 xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel rdf:about="http://www.xml.com/xml/news.rss">
    <title>XML.com</title>
    <link>http://xml.com/pub</link>
    <description>XML.com features a rich mix of information.</description>
    <dc:date>2000-01-01T12:00:00+00:00</dc:date>
    <items>
      <rdf:Seq><rdf:li resource="http://xml.com/pub/2000/08/09/xslt/xslt.html"/></rdf:Seq>
    </items>
  </channel>
  <image rdf:about="http://xml.com/universal/images/xml_tiny.gif">
    <title>XML.com</title>
    <url>http://xml.com/universal/images/xml_tiny.gif</url>
  </image>
  <item rdf:about="http://xml.com/pub/2000/08/09/xslt/xslt.html">
    <title>Processing Inclusions with XSLT</title>
    <link>http://xml.com/pub/2000/08/09/xslt/xslt.html</link>
    <dc:creator>Bob</dc:creator>
  </item>
  <textinput rdf:about="http://search.xml.com"><title>Search</title><name>s</name></textinput>
</rdf:RDF>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_rss_10(doc.root_element(), &settings()).unwrap();
        let channel = &feed.channel;

        assert_eq!(channel.title, "XML.com");
        assert!(channel.pub_date.is_some());
        assert_eq!(channel.image.as_ref().and_then(|i| i.title.as_deref()), Some("XML.com"));
        assert_eq!(channel.text_input.as_ref().and_then(|t| t.name.as_deref()), Some("s"));
        assert_eq!(channel.items.len(), 1);
        assert_eq!(channel.items[0].author.as_deref(), Some("Bob"));
        assert_eq!(
            channel.items[0].guid.as_ref().map(|g| g.value.as_str()),
            Some("http://xml.com/pub/2000/08/09/xslt/xslt.html")
        );
        // Dublin Core elements stay visible as extensions; native ones do not
        assert!(channel.extensions.iter().any(|e| e.name == "date"));
        assert!(channel.extensions.iter().all(|e| e.name != "items"));
    }

    #[test]
    fn test_rss_090_uses_netscape_namespace() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns="http://my.netscape.com/rdf/simple/0.9/">
  <channel><title>Mozilla Dot Org</title><link>http://www.mozilla.org</link></channel>
  <item><title>New Status Updates</title><link>http://www.mozilla.org/status/</link></item>
  <item><title>Bugzilla Reorganized</title><link>http://www.mozilla.org/bugs/</link></item>
</rdf:RDF>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_rss_090(doc.root_element(), &settings()).unwrap();
        assert_eq!(feed.channel.title, "Mozilla Dot Org");
        assert_eq!(feed.channel.items.len(), 2);

        // Same document read with the 1.0 namespace finds no channel
        assert!(parse_rss_10(doc.root_element(), &settings()).is_err());
    }
}
