//! Namespace-aware helpers for navigating `roxmltree` nodes.
//!
//! Every lookup matches on `(namespace, local name)`. `None` as namespace
//! means "no namespace", which is what RSS 0.9x/2.0, OPML and un-namespaced
//! RSD documents use.

use roxmltree::Node;

/// Check whether a node is an element with the given namespace and local name.
pub fn is_element(node: Node<'_, '_>, ns: Option<&str>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == ns
}

/// Find the first child element with the given namespace and local name.
pub fn child<'a, 'input>(
    node: Node<'a, 'input>,
    ns: Option<&str>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_element(*c, ns, name))
}

/// Find all child elements with the given namespace and local name.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    ns: Option<&'a str>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| is_element(*c, ns, name))
}

/// All text beneath a node (text and CDATA, descendants included), trimmed.
///
/// Returns `None` when the result is empty.
pub fn text(node: Node<'_, '_>) -> Option<String> {
    let joined: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    non_empty(&joined)
}

/// The node's child markup exactly as it appears in the source text, trimmed.
///
/// Used for embedded XHTML, where flattening to text would lose the markup.
pub fn inner_xml(node: Node<'_, '_>) -> Option<String> {
    let first = node.first_child()?;
    let last = node.last_child()?;
    let input = node.document().input_text();
    input
        .get(first.range().start..last.range().end)
        .and_then(non_empty)
}

/// Trimmed text of the first matching child element.
pub fn child_text(node: Node<'_, '_>, ns: Option<&str>, name: &str) -> Option<String> {
    child(node, ns, name).and_then(text)
}

/// Trimmed value of an un-namespaced attribute, `None` if absent or blank.
pub fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).and_then(non_empty)
}

/// Parse a boolean attribute leniently (`true`/`false`, `1`/`0`, any case).
pub fn attr_bool(node: Node<'_, '_>, name: &str) -> Option<bool> {
    parse_bool(node.attribute(name)?)
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
