use crate::config::LoadSettings;
use roxmltree::Node;
use serde::Serialize;
use std::collections::BTreeMap;

/// A child element from a vocabulary other than the host format's own,
/// such as `dc:creator` inside an RSS 2.0 item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtensionElement {
    pub namespace: Option<String>,
    pub name: String,
    /// Attributes keyed by local name.
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
}

impl ExtensionElement {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            namespace: node.tag_name().namespace().map(str::to_string),
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            text: super::nav::text(node),
        }
    }
}

/// Collects the children of `parent` whose namespace differs from `native`.
///
/// At most `settings.max_extension_elements` are kept; the rest are dropped.
pub fn collect_extensions(
    parent: Node<'_, '_>,
    native: Option<&str>,
    settings: &LoadSettings,
) -> Vec<ExtensionElement> {
    collect_where(parent, settings, |c| c.tag_name().namespace() != native)
}

/// Collects every child element of `parent`, for containers whose whole
/// payload is opaque to the host format.
pub fn collect_children(parent: Node<'_, '_>, settings: &LoadSettings) -> Vec<ExtensionElement> {
    collect_where(parent, settings, |_| true)
}

fn collect_where(
    parent: Node<'_, '_>,
    settings: &LoadSettings,
    keep: impl Fn(&Node<'_, '_>) -> bool,
) -> Vec<ExtensionElement> {
    let mut candidates = parent.children().filter(|c| c.is_element() && keep(c));

    let kept: Vec<ExtensionElement> = candidates
        .by_ref()
        .take(settings.max_extension_elements)
        .map(ExtensionElement::from_node)
        .collect();

    let dropped = candidates.count();
    if dropped > 0 {
        tracing::debug!(
            parent = parent.tag_name().name(),
            kept = kept.len(),
            dropped,
            "Extension element limit reached"
        );
    }

    kept
}
