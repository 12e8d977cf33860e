//! BlogML 2.0, the blog export/import format.
//!
//! A `<blog>` root carries authors, categories and posts. Posts reference
//! categories and authors by id; the references are kept as ids rather
//! than resolved.

use super::{expect_root, ns, parse_date, parse_url, VariantError};
use crate::config::LoadSettings;
use crate::xml::nav::{attr, attr_bool, child, child_text, children, text};
use crate::xml::{collect_extensions, ExtensionElement};
use chrono::{DateTime, FixedOffset};
use roxmltree::Node;
use serde::Serialize;
use url::Url;

const BLOGML: Option<&str> = Some(ns::BLOGML_20);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLDocument {
    pub root_url: Option<Url>,
    pub date_created: Option<DateTime<FixedOffset>>,
    pub title: Option<BlogMLText>,
    pub sub_title: Option<BlogMLText>,
    pub authors: Vec<BlogMLAuthor>,
    pub extended_properties: Vec<BlogMLProperty>,
    pub categories: Vec<BlogMLCategory>,
    pub posts: Vec<BlogMLPost>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogMLContentType {
    #[default]
    Text,
    Html,
    Xhtml,
    Base64,
}

impl BlogMLContentType {
    fn parse(value: Option<String>) -> Self {
        match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("html") => Self::Html,
            Some("xhtml") => Self::Xhtml,
            Some("base64") => Self::Base64,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLText {
    pub content_type: BlogMLContentType,
    pub value: String,
}

/// Fields shared by every identified BlogML node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLNode {
    pub id: Option<String>,
    pub title: Option<BlogMLText>,
    pub date_created: Option<DateTime<FixedOffset>>,
    pub date_modified: Option<DateTime<FixedOffset>>,
    pub approved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLAuthor {
    pub node: BlogMLNode,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLProperty {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLCategory {
    pub node: BlogMLNode,
    pub description: Option<String>,
    pub parent_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLPost {
    pub node: BlogMLNode,
    pub post_url: Option<Url>,
    pub post_name: Option<BlogMLText>,
    pub post_type: Option<String>,
    pub views: Option<u64>,
    pub content: Option<BlogMLText>,
    pub excerpt: Option<BlogMLText>,
    pub category_refs: Vec<String>,
    pub author_refs: Vec<String>,
    pub comments: Vec<BlogMLComment>,
    pub trackbacks: Vec<BlogMLTrackback>,
    pub attachments: Vec<BlogMLAttachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLComment {
    pub node: BlogMLNode,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_url: Option<Url>,
    pub content: Option<BlogMLText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLTrackback {
    pub node: BlogMLNode,
    pub url: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlogMLAttachment {
    pub url: Option<String>,
    pub external_uri: Option<Url>,
    pub mime_type: Option<String>,
    pub embedded: bool,
    /// Base64 payload when `embedded` is set.
    pub data: Option<String>,
}

pub fn parse_blogml_20(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<BlogMLDocument, VariantError> {
    expect_root(root, "blog")?;

    let extended_properties = section(root, "extended-properties", "property")
        .filter_map(|p| {
            Some(BlogMLProperty {
                name: attr(p, "name")?,
                value: attr(p, "value"),
            })
        })
        .collect();

    Ok(BlogMLDocument {
        root_url: parse_url(attr(root, "root-url"), "blog.root-url"),
        date_created: attr(root, "date-created").and_then(|v| parse_date(&v)),
        title: blog_text(root, "title"),
        sub_title: blog_text(root, "sub-title"),
        authors: section(root, "authors", "author")
            .map(|a| BlogMLAuthor {
                node: parse_node(a),
                email: attr(a, "email"),
            })
            .collect(),
        extended_properties,
        categories: section(root, "categories", "category")
            .map(|c| BlogMLCategory {
                node: parse_node(c),
                description: attr(c, "description"),
                parent_ref: attr(c, "parentref"),
            })
            .collect(),
        posts: section(root, "posts", "post").map(parse_post).collect(),
        extensions: collect_extensions(root, BLOGML, settings),
    })
}

fn parse_post(post: Node<'_, '_>) -> BlogMLPost {
    BlogMLPost {
        node: parse_node(post),
        post_url: parse_url(attr(post, "post-url"), "post.post-url"),
        post_name: blog_text(post, "post-name"),
        post_type: attr(post, "type"),
        views: attr(post, "views").and_then(|v| v.parse().ok()),
        content: blog_text(post, "content"),
        excerpt: blog_text(post, "excerpt"),
        category_refs: section(post, "categories", "category")
            .filter_map(|c| attr(c, "ref"))
            .collect(),
        author_refs: section(post, "authors", "author")
            .filter_map(|a| attr(a, "ref"))
            .collect(),
        comments: section(post, "comments", "comment")
            .map(|c| BlogMLComment {
                node: parse_node(c),
                user_name: attr(c, "user-name"),
                user_email: attr(c, "user-email"),
                user_url: parse_url(attr(c, "user-url"), "comment.user-url"),
                content: blog_text(c, "content"),
            })
            .collect(),
        trackbacks: section(post, "trackbacks", "trackback")
            .map(|t| BlogMLTrackback {
                node: parse_node(t),
                url: parse_url(attr(t, "url"), "trackback.url"),
            })
            .collect(),
        attachments: section(post, "attachments", "attachment")
            .map(|a| BlogMLAttachment {
                url: attr(a, "url"),
                external_uri: parse_url(attr(a, "external-uri"), "attachment.external-uri"),
                mime_type: attr(a, "mime-type"),
                embedded: attr_bool(a, "embedded").unwrap_or(false),
                data: text(a),
            })
            .collect(),
    }
}

fn parse_node(node: Node<'_, '_>) -> BlogMLNode {
    BlogMLNode {
        id: attr(node, "id"),
        title: blog_text(node, "title"),
        date_created: attr(node, "date-created").and_then(|v| parse_date(&v)),
        date_modified: attr(node, "date-modified").and_then(|v| parse_date(&v)),
        // BlogML treats a missing flag as approved
        approved: attr_bool(node, "approved").unwrap_or(true),
    }
}

/// `<wrapper><item/>...</wrapper>` children, empty when the wrapper is absent.
fn section<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    wrapper: &'a str,
    item: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    child(parent, BLOGML, wrapper)
        .into_iter()
        .flat_map(move |w| children(w, BLOGML, item))
}

fn blog_text(parent: Node<'_, '_>, name: &str) -> Option<BlogMLText> {
    let node = child(parent, BLOGML, name)?;
    Some(BlogMLText {
        content_type: BlogMLContentType::parse(attr(node, "type")),
        value: child_text(parent, BLOGML, name)?,
    })
}
