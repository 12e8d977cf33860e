//! Atom 0.3 and 1.0 feeds and entries.
//!
//! Both versions share one reader, parameterised by a [`Vocabulary`] that
//! names the elements 0.3 called differently (`tagline`, `copyright`,
//! `modified`, `issued`, person `url`). Each version has two entry points:
//! one for a `<feed>` root and one for a standalone `<entry>` root.

use super::{expect_root, ns, parse_date, parse_url_with_base, xml_base, VariantError};
use crate::config::LoadSettings;
use crate::xml::nav::{attr, child, child_text, children, inner_xml, text};
use crate::xml::{collect_extensions, ExtensionElement};
use chrono::{DateTime, FixedOffset};
use roxmltree::Node;
use serde::Serialize;
use url::Url;

// ============================================================================
// Document Model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomFeed {
    pub id: Option<String>,
    pub title: Option<AtomText>,
    pub subtitle: Option<AtomText>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub authors: Vec<AtomPerson>,
    pub contributors: Vec<AtomPerson>,
    pub links: Vec<AtomLink>,
    pub categories: Vec<AtomCategory>,
    pub generator: Option<AtomGenerator>,
    pub icon: Option<Url>,
    pub logo: Option<Url>,
    pub rights: Option<AtomText>,
    pub entries: Vec<AtomEntry>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomEntry {
    pub id: Option<String>,
    pub title: Option<AtomText>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub published: Option<DateTime<FixedOffset>>,
    pub authors: Vec<AtomPerson>,
    pub contributors: Vec<AtomPerson>,
    pub links: Vec<AtomLink>,
    pub categories: Vec<AtomCategory>,
    pub summary: Option<AtomText>,
    pub content: Option<AtomContent>,
    pub rights: Option<AtomText>,
    pub extensions: Vec<ExtensionElement>,
}

/// A text construct. `text_type` is `text`, `html` or `xhtml` in 1.0, or a
/// media type in 0.3.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomText {
    pub text_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomContent {
    pub content_type: Option<String>,
    /// Out-of-line content location (1.0 `src`).
    pub src: Option<Url>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomPerson {
    pub name: String,
    pub uri: Option<Url>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomLink {
    pub href: Option<Url>,
    pub rel: Option<String>,
    pub media_type: Option<String>,
    pub hreflang: Option<String>,
    pub title: Option<String>,
    pub length: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomCategory {
    pub term: String,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomGenerator {
    pub name: String,
    pub uri: Option<Url>,
    pub version: Option<String>,
}

// ============================================================================
// Vocabulary
// ============================================================================

/// Element and attribute names that differ between Atom versions.
#[derive(Debug)]
struct Vocabulary {
    ns: &'static str,
    subtitle: &'static str,
    rights: &'static str,
    updated: &'static str,
    published: &'static str,
    person_uri: &'static str,
    generator_uri: &'static str,
}

const ATOM_10: Vocabulary = Vocabulary {
    ns: ns::ATOM_10,
    subtitle: "subtitle",
    rights: "rights",
    updated: "updated",
    published: "published",
    person_uri: "uri",
    generator_uri: "uri",
};

const ATOM_03: Vocabulary = Vocabulary {
    ns: ns::ATOM_03,
    subtitle: "tagline",
    rights: "copyright",
    updated: "modified",
    published: "issued",
    person_uri: "url",
    generator_uri: "url",
};

// ============================================================================
// Entry Points
// ============================================================================

pub fn parse_atom_10_feed(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<AtomFeed, VariantError> {
    parse_feed(root, &ATOM_10, settings)
}

pub fn parse_atom_10_entry(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<AtomEntry, VariantError> {
    expect_root(root, "entry")?;
    Ok(parse_entry(root, &ATOM_10, settings))
}

pub fn parse_atom_03_feed(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<AtomFeed, VariantError> {
    parse_feed(root, &ATOM_03, settings)
}

pub fn parse_atom_03_entry(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<AtomEntry, VariantError> {
    expect_root(root, "entry")?;
    Ok(parse_entry(root, &ATOM_03, settings))
}

// ============================================================================
// Readers
// ============================================================================

fn parse_feed(
    root: Node<'_, '_>,
    vocab: &Vocabulary,
    settings: &LoadSettings,
) -> Result<AtomFeed, VariantError> {
    expect_root(root, "feed")?;
    let ns = Some(vocab.ns);

    let feed = AtomFeed {
        id: child_text(root, ns, "id"),
        title: child(root, ns, "title").map(|n| parse_text(n, vocab)),
        subtitle: child(root, ns, vocab.subtitle).map(|n| parse_text(n, vocab)),
        updated: child_text(root, ns, vocab.updated).and_then(|v| parse_date(&v)),
        authors: parse_people(root, vocab, "author"),
        contributors: parse_people(root, vocab, "contributor"),
        links: children(root, ns, "link").map(parse_link).collect(),
        categories: parse_categories(root, vocab),
        generator: child(root, ns, "generator").and_then(|n| {
            Some(AtomGenerator {
                name: text(n)?,
                uri: resolve(n, attr(n, vocab.generator_uri), "generator.uri"),
                version: attr(n, "version"),
            })
        }),
        icon: child(root, ns, "icon").and_then(|n| resolve(n, text(n), "feed.icon")),
        logo: child(root, ns, "logo").and_then(|n| resolve(n, text(n), "feed.logo")),
        rights: child(root, ns, vocab.rights).map(|n| parse_text(n, vocab)),
        entries: children(root, ns, "entry")
            .map(|entry| parse_entry(entry, vocab, settings))
            .collect(),
        extensions: collect_extensions(root, ns, settings),
    };

    tracing::trace!(entries = feed.entries.len(), ns = vocab.ns, "Parsed Atom feed");
    Ok(feed)
}

fn parse_entry(entry: Node<'_, '_>, vocab: &Vocabulary, settings: &LoadSettings) -> AtomEntry {
    let ns = Some(vocab.ns);

    AtomEntry {
        id: child_text(entry, ns, "id"),
        title: child(entry, ns, "title").map(|n| parse_text(n, vocab)),
        updated: child_text(entry, ns, vocab.updated).and_then(|v| parse_date(&v)),
        published: child_text(entry, ns, vocab.published).and_then(|v| parse_date(&v)),
        authors: parse_people(entry, vocab, "author"),
        contributors: parse_people(entry, vocab, "contributor"),
        links: children(entry, ns, "link").map(parse_link).collect(),
        categories: parse_categories(entry, vocab),
        summary: child(entry, ns, "summary").map(|n| parse_text(n, vocab)),
        content: child(entry, ns, "content").map(|n| parse_content(n, vocab)),
        rights: child(entry, ns, vocab.rights).map(|n| parse_text(n, vocab)),
        extensions: collect_extensions(entry, ns, settings),
    }
}

/// Reads a text construct, keeping embedded markup for XHTML and 0.3
/// `mode="xml"` content.
fn parse_text(node: Node<'_, '_>, vocab: &Vocabulary) -> AtomText {
    let text_type = attr(node, "type").unwrap_or_else(|| default_type(vocab).to_string());
    let value = if is_inline_xml(node, vocab) {
        inner_xml(node)
    } else {
        text(node)
    };

    AtomText {
        text_type,
        value: value.unwrap_or_default(),
    }
}

fn parse_content(node: Node<'_, '_>, vocab: &Vocabulary) -> AtomContent {
    let value = if is_inline_xml(node, vocab) {
        inner_xml(node)
    } else {
        text(node)
    };

    AtomContent {
        content_type: attr(node, "type"),
        src: resolve(node, attr(node, "src"), "content.src"),
        value,
    }
}

fn default_type(vocab: &Vocabulary) -> &'static str {
    if vocab.ns == ns::ATOM_03 {
        "text/plain"
    } else {
        "text"
    }
}

fn is_inline_xml(node: Node<'_, '_>, vocab: &Vocabulary) -> bool {
    if vocab.ns == ns::ATOM_03 {
        node.attribute("mode") == Some("xml")
    } else {
        node.attribute("type") == Some("xhtml")
    }
}

/// Parses a URL read from `node`, relative to the `xml:base` in effect there.
fn resolve(node: Node<'_, '_>, value: Option<String>, field: &'static str) -> Option<Url> {
    parse_url_with_base(value, xml_base(node).as_ref(), field)
}

fn parse_people(parent: Node<'_, '_>, vocab: &Vocabulary, element: &str) -> Vec<AtomPerson> {
    let ns = Some(vocab.ns);
    children(parent, ns, element)
        .filter_map(|n| {
            Some(AtomPerson {
                name: child_text(n, ns, "name")?,
                uri: child(n, ns, vocab.person_uri).and_then(|u| resolve(u, text(u), "person.uri")),
                email: child_text(n, ns, "email"),
            })
        })
        .collect()
}

fn parse_link(node: Node<'_, '_>) -> AtomLink {
    AtomLink {
        href: resolve(node, attr(node, "href"), "link.href"),
        rel: attr(node, "rel"),
        media_type: attr(node, "type"),
        hreflang: attr(node, "hreflang"),
        title: attr(node, "title"),
        length: attr(node, "length").and_then(|v| v.parse().ok()),
    }
}

fn parse_categories(parent: Node<'_, '_>, vocab: &Vocabulary) -> Vec<AtomCategory> {
    children(parent, Some(vocab.ns), "category")
        .filter_map(|n| {
            Some(AtomCategory {
                term: attr(n, "term")?,
                scheme: attr(n, "scheme"),
                label: attr(n, "label"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const ATOM_10_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title type="text">dive into mark</title>
  <subtitle type="html">A &lt;em&gt;lot&lt;/em&gt; of effort
    went into making this effortless</subtitle>
  <updated>2005-07-31T12:29:29Z</updated>
  <id>tag:example.org,2003:3</id>
  <link rel="alternate" type="text/html" hreflang="en" href="http://example.org/"/>
  <rights>Copyright (c) 2003, Mark Pilgrim</rights>
  <generator uri="http://www.example.com/" version="1.0">Example Toolkit</generator>
  <media:thumbnail url="http://example.org/t.png"/>
  <entry>
    <title>Atom draft-07 snapshot</title>
    <link rel="enclosure" type="audio/mpeg" length="1337"
          href="http://example.org/audio/ph34r_my_podcast.mp3"/>
    <id>tag:example.org,2003:3.2397</id>
    <updated>2005-07-31T12:29:29Z</updated>
    <published>2003-12-13T08:29:29-04:00</published>
    <author>
      <name>Mark Pilgrim</name><uri>http://example.org/</uri><email>f8dy@example.com</email>
    </author>
    <contributor><name>Sam Ruby</name></contributor>
    <category term="atom" scheme="http://example.org/tags" label="Atom"/>
    <content type="xhtml" xml:lang="en"><div xmlns="http://www.w3.org/1999/xhtml">
      <p><i>[Update: The Atom draft is finished.]</i></p>
    </div></content>
  </entry>
</feed>"#;

    #[test]
    fn test_atom_10_feed() {
        let doc = Document::parse(ATOM_10_FEED).unwrap();
        let feed = parse_atom_10_feed(doc.root_element(), &LoadSettings::default()).unwrap();

        assert_eq!(feed.id.as_deref(), Some("tag:example.org,2003:3"));
        assert_eq!(feed.title.as_ref().unwrap().value, "dive into mark");
        let subtitle = feed.subtitle.as_ref().unwrap();
        assert_eq!(subtitle.text_type, "html");
        assert!(subtitle.value.contains("<em>lot</em>"));
        assert!(feed.updated.is_some());
        assert_eq!(feed.links.len(), 1);
        assert_eq!(feed.links[0].hreflang.as_deref(), Some("en"));
        assert_eq!(feed.generator.as_ref().unwrap().name, "Example Toolkit");
        assert_eq!(feed.extensions.len(), 1);
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.links[0].length, Some(1337));
        assert_eq!(entry.authors[0].name, "Mark Pilgrim");
        assert_eq!(entry.contributors[0].name, "Sam Ruby");
        assert_eq!(entry.categories[0].label.as_deref(), Some("Atom"));
        assert_eq!(
            entry.published.unwrap().offset().local_minus_utc(),
            -4 * 3600
        );
        let content = entry.content.as_ref().unwrap().value.as_deref().unwrap();
        assert!(content.starts_with("<div"));
        assert!(content.contains("<i>[Update: The Atom draft is finished.]</i>"));
    }

    #[test]
    fn test_atom_10_entry_root() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom">
            <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
            <title>Atom-Powered Robots Run Amok</title>
            <updated>2003-12-13T18:30:02Z</updated>
            <summary>Some text.</summary>
        </entry>"#;
        let doc = Document::parse(xml).unwrap();
        let entry = parse_atom_10_entry(doc.root_element(), &LoadSettings::default()).unwrap();

        assert_eq!(entry.title.unwrap().value, "Atom-Powered Robots Run Amok");
        assert_eq!(entry.summary.unwrap().text_type, "text");
    }

    #[test]
    fn test_relative_links_follow_xml_base() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom" xml:base="https://example.org/blog/">
            <link rel="alternate" href="/"/>
            <icon>favicon.ico</icon>
            <entry xml:base="2005/07/">
              <link href="post.html"/>
              <author><name>M</name><uri>../../about</uri></author>
            </entry>
        </feed>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_atom_10_feed(doc.root_element(), &LoadSettings::default()).unwrap();

        fn href(link: &AtomLink) -> Option<&str> {
            link.href.as_ref().map(Url::as_str)
        }
        assert_eq!(href(&feed.links[0]), Some("https://example.org/"));
        assert_eq!(
            feed.icon.as_ref().map(Url::as_str),
            Some("https://example.org/blog/favicon.ico")
        );

        let entry = &feed.entries[0];
        assert_eq!(href(&entry.links[0]), Some("https://example.org/blog/2005/07/post.html"));
        assert_eq!(
            entry.authors[0].uri.as_ref().map(Url::as_str),
            Some("https://example.org/blog/about")
        );
    }

    #[test]
    fn test_relative_link_without_base_is_dropped() {
        let xml = r#"<entry xmlns="http://www.w3.org/2005/Atom"><link href="post.html"/></entry>"#;
        let doc = Document::parse(xml).unwrap();
        let entry = parse_atom_10_entry(doc.root_element(), &LoadSettings::default()).unwrap();
        assert_eq!(entry.links.len(), 1);
        assert!(entry.links[0].href.is_none());
    }

    #[test]
    fn test_feed_entry_point_rejects_entry_root() {
        let doc = Document::parse(r#"<entry xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();
        let err = parse_atom_10_feed(doc.root_element(), &LoadSettings::default()).unwrap_err();
        assert!(matches!(err, VariantError::UnexpectedRoot { expected: "feed", .. }));
    }

    #[test]
    fn test_entry_entry_point_rejects_feed_root() {
        let doc = Document::parse(r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();
        let err = parse_atom_10_entry(doc.root_element(), &LoadSettings::default()).unwrap_err();
        assert!(matches!(err, VariantError::UnexpectedRoot { expected: "entry", .. }));
    }

    #[test]
    fn test_atom_03_vocabulary() {
        let xml = r#"<feed version="0.3" xmlns="http://purl.org/atom/ns#">
  <title mode="escaped" type="text/html">dive into &lt;b&gt;mark&lt;/b&gt;</title>
  <tagline>A lot of effort went into making this effortless</tagline>
  <copyright>Copyright (c) 2003</copyright>
  <modified>2003-12-13T18:30:02Z</modified>
  <generator url="http://www.example.com/" version="1.0">Example Toolkit</generator>
  <entry>
    <title>Atom 0.3 snapshot</title>
    <issued>2003-12-13T08:29:29-04:00</issued>
    <modified>2003-12-13T18:30:02Z</modified>
    <author><name>Mark Pilgrim</name><url>http://example.org/</url></author>
    <content type="application/xhtml+xml" mode="xml">
      <div xmlns="http://www.w3.org/1999/xhtml">Hi</div>
    </content>
  </entry>
</feed>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_atom_03_feed(doc.root_element(), &LoadSettings::default()).unwrap();

        assert_eq!(feed.title.as_ref().unwrap().value, "dive into <b>mark</b>");
        assert!(feed.subtitle.is_some());
        assert!(feed.rights.is_some());
        assert!(feed.updated.is_some());
        assert_eq!(
            feed.generator.as_ref().and_then(|g| g.uri.as_ref()).map(Url::as_str),
            Some("http://www.example.com/")
        );

        let entry = &feed.entries[0];
        assert!(entry.published.is_some());
        assert_eq!(
            entry.authors[0].uri.as_ref().map(Url::as_str),
            Some("http://example.org/")
        );
        assert!(entry
            .content
            .as_ref()
            .and_then(|c| c.value.as_deref())
            .is_some_and(|v| v.starts_with("<div")));
    }

    #[test]
    fn test_atom_10_reader_ignores_03_elements() {
        let xml = r#"<feed xmlns="http://purl.org/atom/ns#"><title>t</title></feed>"#;
        let doc = Document::parse(xml).unwrap();
        let feed = parse_atom_10_feed(doc.root_element(), &LoadSettings::default()).unwrap();
        // Wrong namespace: nothing native is read, everything is an extension
        assert!(feed.title.is_none());
        assert_eq!(feed.extensions.len(), 1);
    }
}
