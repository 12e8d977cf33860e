//! OPML 1.0, 1.1 and 2.0 outlines.
//!
//! The three versions are read by one variant: 2.0 only adds attributes and
//! head elements, which are simply absent from older documents.

use super::{expect_root, parse_date, parse_url, VariantError};
use crate::config::LoadSettings;
use crate::xml::nav::{attr, attr_bool, child, child_text, children};
use crate::xml::{collect_extensions, ExtensionElement};
use chrono::{DateTime, FixedOffset};
use roxmltree::Node;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// SEC-003: Maximum allowed nesting depth for outline elements.
/// Prevents stack exhaustion from maliciously deeply nested documents.
pub const MAX_OPML_DEPTH: usize = 50;

/// Outline attributes mapped to dedicated fields; everything else lands in
/// [`OpmlOutline::attributes`].
const KNOWN_OUTLINE_ATTRIBUTES: [&str; 13] = [
    "text",
    "type",
    "isComment",
    "isBreakpoint",
    "created",
    "category",
    "title",
    "xmlUrl",
    "htmlUrl",
    "description",
    "language",
    "version",
    "url",
];

// ============================================================================
// Document Model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpmlDocument {
    pub head: OpmlHead,
    pub outlines: Vec<OpmlOutline>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpmlHead {
    pub title: Option<String>,
    pub date_created: Option<DateTime<FixedOffset>>,
    pub date_modified: Option<DateTime<FixedOffset>>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_id: Option<Url>,
    pub docs: Option<Url>,
    /// Line numbers of expanded outlines.
    pub expansion_state: Vec<usize>,
    pub vert_scroll_state: Option<usize>,
    pub window_top: Option<i32>,
    pub window_left: Option<i32>,
    pub window_bottom: Option<i32>,
    pub window_right: Option<i32>,
    pub extensions: Vec<ExtensionElement>,
}

/// A single `<outline>`. Subscription lists use `type="rss"` with an
/// `xmlUrl`; folders are outlines with children and no URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpmlOutline {
    /// Sourced from `text`, falling back to `title`.
    pub text: String,
    pub outline_type: Option<String>,
    pub is_comment: bool,
    pub is_breakpoint: bool,
    pub created: Option<DateTime<FixedOffset>>,
    pub categories: Vec<String>,
    pub title: Option<String>,
    pub xml_url: Option<Url>,
    pub html_url: Option<Url>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub version: Option<String>,
    pub url: Option<Url>,
    pub attributes: BTreeMap<String, String>,
    pub outlines: Vec<OpmlOutline>,
}

// ============================================================================
// Parser
// ============================================================================

/// Reads an OPML 1.0, 1.1 or 2.0 document.
///
/// # Errors
///
/// - [`VariantError::UnexpectedRoot`] if the root is not `<opml>`
/// - [`VariantError::MaxDepthExceeded`] if outlines nest deeper than
///   [`MAX_OPML_DEPTH`]
pub fn parse_opml(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<OpmlDocument, VariantError> {
    expect_root(root, "opml")?;
    // Almost always no namespace; a namespaced root carries its children along
    let opml = root.tag_name().namespace();

    let head = child(root, opml, "head")
        .map(|n| parse_head(n, opml, settings))
        .unwrap_or_default();

    let outlines = match child(root, opml, "body") {
        Some(body) => parse_outlines(body, opml, 1)?,
        None => Vec::new(),
    };

    Ok(OpmlDocument { head, outlines })
}

fn parse_head(head: Node<'_, '_>, opml: Option<&str>, settings: &LoadSettings) -> OpmlHead {
    let int = |name: &str| child_text(head, opml, name).and_then(|v| v.parse::<i32>().ok());

    OpmlHead {
        title: child_text(head, opml, "title"),
        date_created: child_text(head, opml, "dateCreated").and_then(|v| parse_date(&v)),
        date_modified: child_text(head, opml, "dateModified").and_then(|v| parse_date(&v)),
        owner_name: child_text(head, opml, "ownerName"),
        owner_email: child_text(head, opml, "ownerEmail"),
        owner_id: parse_url(child_text(head, opml, "ownerId"), "head.ownerId"),
        docs: parse_url(child_text(head, opml, "docs"), "head.docs"),
        expansion_state: child_text(head, opml, "expansionState")
            .map(|v| {
                v.split(',')
                    .filter_map(|n| n.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default(),
        vert_scroll_state: child_text(head, opml, "vertScrollState").and_then(|v| v.parse().ok()),
        window_top: int("windowTop"),
        window_left: int("windowLeft"),
        window_bottom: int("windowBottom"),
        window_right: int("windowRight"),
        extensions: collect_extensions(head, opml, settings),
    }
}

fn parse_outlines(
    parent: Node<'_, '_>,
    opml: Option<&str>,
    depth: usize,
) -> Result<Vec<OpmlOutline>, VariantError> {
    children(parent, opml, "outline")
        .map(|n| parse_outline(n, opml, depth))
        .collect()
}

fn parse_outline(
    node: Node<'_, '_>,
    opml: Option<&str>,
    depth: usize,
) -> Result<OpmlOutline, VariantError> {
    // SEC-003: Reject excessively nested outlines before recursing
    if depth > MAX_OPML_DEPTH {
        return Err(VariantError::MaxDepthExceeded(MAX_OPML_DEPTH));
    }

    let title = attr(node, "title");
    let text = attr(node, "text")
        .or_else(|| title.clone())
        .unwrap_or_default();

    let attributes = node
        .attributes()
        .filter(|a| a.namespace().is_none() && !KNOWN_OUTLINE_ATTRIBUTES.contains(&a.name()))
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();

    Ok(OpmlOutline {
        text,
        outline_type: attr(node, "type"),
        is_comment: attr_bool(node, "isComment").unwrap_or(false),
        is_breakpoint: attr_bool(node, "isBreakpoint").unwrap_or(false),
        created: attr(node, "created").and_then(|v| parse_date(&v)),
        categories: attr(node, "category")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        title,
        xml_url: parse_url(attr(node, "xmlUrl"), "outline.xmlUrl"),
        html_url: parse_url(attr(node, "htmlUrl"), "outline.htmlUrl"),
        description: attr(node, "description"),
        language: attr(node, "language"),
        version: attr(node, "version"),
        url: parse_url(attr(node, "url"), "outline.url"),
        attributes,
        outlines: parse_outlines(node, opml, depth + 1)?,
    })
}
