//! Really Simple Discovery (RSD) 0.6 and 1.0.
//!
//! Both versions describe a blog engine and the editing APIs it exposes.
//! 1.0 adds a per-API `<settings>` block.

use super::{expect_root, parse_url, VariantError};
use crate::config::LoadSettings;
use crate::xml::nav::{attr, attr_bool, child, child_text, children, text};
use crate::xml::{collect_extensions, ExtensionElement};
use roxmltree::Node;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RsdDocument {
    pub engine_name: Option<String>,
    pub engine_link: Option<Url>,
    pub homepage_link: Option<Url>,
    pub apis: Vec<RsdApi>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RsdApi {
    pub name: String,
    pub preferred: bool,
    pub api_link: Option<Url>,
    pub blog_id: Option<String>,
    pub docs: Option<Url>,
    pub notes: Option<String>,
    pub settings: Vec<RsdSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RsdSetting {
    pub name: String,
    pub value: Option<String>,
}

pub fn parse_rsd_06(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RsdDocument, VariantError> {
    parse_rsd(root, false, settings)
}

pub fn parse_rsd_10(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<RsdDocument, VariantError> {
    parse_rsd(root, true, settings)
}

fn parse_rsd(
    root: Node<'_, '_>,
    with_settings: bool,
    settings: &LoadSettings,
) -> Result<RsdDocument, VariantError> {
    expect_root(root, "rsd")?;
    // Children follow the root's namespace. Un-namespaced documents are common
    let rsd_ns = root.tag_name().namespace();
    let service = child(root, rsd_ns, "service").ok_or(VariantError::MissingElement("service"))?;

    let apis = child(service, rsd_ns, "apis")
        .map(|apis| {
            children(apis, rsd_ns, "api")
                .filter_map(|api| parse_api(api, rsd_ns, with_settings))
                .collect()
        })
        .unwrap_or_default();

    Ok(RsdDocument {
        engine_name: child_text(service, rsd_ns, "engineName"),
        engine_link: parse_url(child_text(service, rsd_ns, "engineLink"), "service.engineLink"),
        homepage_link: parse_url(
            child_text(service, rsd_ns, "homePageLink"),
            "service.homePageLink",
        ),
        apis,
        extensions: collect_extensions(service, rsd_ns, settings),
    })
}

fn parse_api(api: Node<'_, '_>, rsd_ns: Option<&str>, with_settings: bool) -> Option<RsdApi> {
    let mut out = RsdApi {
        name: attr(api, "name")?,
        preferred: attr_bool(api, "preferred").unwrap_or(false),
        api_link: parse_url(attr(api, "apiLink"), "api.apiLink"),
        blog_id: attr(api, "blogID"),
        ..Default::default()
    };

    if let Some(block) = child(api, rsd_ns, "settings").filter(|_| with_settings) {
        out.docs = parse_url(child_text(block, rsd_ns, "docs"), "api.settings.docs");
        out.notes = child_text(block, rsd_ns, "notes");
        out.settings = children(block, rsd_ns, "setting")
            .filter_map(|n| {
                Some(RsdSetting {
                    name: attr(n, "name")?,
                    value: text(n),
                })
            })
            .collect();
    }

    Some(out)
}
