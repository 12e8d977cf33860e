//! Attention Profiling Markup Language (APML) 0.6.

use super::{expect_root, parse_date, parse_url, VariantError};
use crate::config::LoadSettings;
use crate::xml::nav::{attr, child, child_text, children};
use crate::xml::{collect_children, collect_extensions, ExtensionElement};
use chrono::{DateTime, FixedOffset};
use roxmltree::Node;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlDocument {
    pub head: ApmlHead,
    pub default_profile: Option<String>,
    pub profiles: Vec<ApmlProfile>,
    pub applications: Vec<ApmlApplication>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlHead {
    pub title: Option<String>,
    pub generator: Option<String>,
    pub user_email: Option<String>,
    pub date_created: Option<DateTime<FixedOffset>>,
    pub extensions: Vec<ExtensionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlProfile {
    pub name: String,
    pub implicit: ApmlData,
    pub explicit: ApmlData,
}

/// Attention data: weighted concepts and sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlData {
    pub concepts: Vec<ApmlConcept>,
    pub sources: Vec<ApmlSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlConcept {
    pub key: String,
    /// Attention weight in `-1.0..=1.0`.
    pub value: f64,
    pub from: Option<String>,
    pub updated: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlSource {
    pub key: Option<Url>,
    pub name: Option<String>,
    pub value: f64,
    pub source_type: Option<String>,
    pub from: Option<String>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub authors: Vec<ApmlAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlAuthor {
    pub key: String,
    pub value: f64,
    pub from: Option<String>,
    pub updated: Option<DateTime<FixedOffset>>,
}

/// Application-specific data. The payload is opaque to APML, so it is kept
/// as extension elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApmlApplication {
    pub name: String,
    pub data: Vec<ExtensionElement>,
}

pub fn parse_apml_06(
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<ApmlDocument, VariantError> {
    expect_root(root, "APML")?;
    // Children follow the root's namespace, whatever it is
    let apml = root.tag_name().namespace();
    let body = child(root, apml, "Body").ok_or(VariantError::MissingElement("Body"))?;

    let head = child(root, apml, "Head")
        .map(|h| ApmlHead {
            title: child_text(h, apml, "Title"),
            generator: child_text(h, apml, "Generator"),
            user_email: child_text(h, apml, "UserEmail"),
            date_created: child_text(h, apml, "DateCreated").and_then(|v| parse_date(&v)),
            extensions: collect_extensions(h, apml, settings),
        })
        .unwrap_or_default();

    let profiles = children(body, apml, "Profile")
        .filter_map(|p| {
            Some(ApmlProfile {
                name: attr(p, "name")?,
                implicit: child(p, apml, "ImplicitData")
                    .map(|d| parse_data(d, apml))
                    .unwrap_or_default(),
                explicit: child(p, apml, "ExplicitData")
                    .map(|d| parse_data(d, apml))
                    .unwrap_or_default(),
            })
        })
        .collect();

    let applications = child(body, apml, "Applications")
        .map(|apps| {
            children(apps, apml, "Application")
                .filter_map(|a| {
                    Some(ApmlApplication {
                        name: attr(a, "name")?,
                        data: collect_children(a, settings),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ApmlDocument {
        head,
        default_profile: attr(body, "defaultprofile"),
        profiles,
        applications,
    })
}

fn parse_data(data: Node<'_, '_>, apml: Option<&str>) -> ApmlData {
    let concepts = child(data, apml, "Concepts")
        .map(|c| {
            children(c, apml, "Concept")
                .filter_map(|n| {
                    Some(ApmlConcept {
                        key: attr(n, "key")?,
                        value: weight(n),
                        from: attr(n, "from"),
                        updated: attr(n, "updated").and_then(|v| parse_date(&v)),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let sources = child(data, apml, "Sources")
        .map(|s| {
            children(s, apml, "Source")
                .map(|n| parse_source(n, apml))
                .collect()
        })
        .unwrap_or_default();

    ApmlData { concepts, sources }
}

fn parse_source(node: Node<'_, '_>, apml: Option<&str>) -> ApmlSource {
    ApmlSource {
        key: parse_url(attr(node, "key"), "source.key"),
        name: attr(node, "name"),
        value: weight(node),
        source_type: attr(node, "type"),
        from: attr(node, "from"),
        updated: attr(node, "updated").and_then(|v| parse_date(&v)),
        authors: children(node, apml, "Author")
            .filter_map(|a| {
                Some(ApmlAuthor {
                    key: attr(a, "key")?,
                    value: weight(a),
                    from: attr(a, "from"),
                    updated: attr(a, "updated").and_then(|v| parse_date(&v)),
                })
            })
            .collect(),
    }
}

fn weight(node: Node<'_, '_>) -> f64 {
    attr(node, "value")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<APML xmlns="http://www.apml.org/apml-0.6" version="0.6">
  <Head>
    <Title>Example APML file for apml.org</Title>
    <Generator>Written by Hand</Generator>
    <UserEmail>sample@apml.org</UserEmail>
    <DateCreated>2007-03-11T01:55:00Z</DateCreated>
  </Head>
  <Body defaultprofile="Work">
    <Profile name="Home">
      <ImplicitData>
        <Concepts>
          <Concept key="attention" value="0.99" from="GatheringTool.com"
                   updated="2007-03-11T01:55:00Z"/>
          <Concept key="content distribution" value="0.97" from="GatheringTool.com"
                   updated="2007-03-11T01:55:00Z"/>
        </Concepts>
        <Sources>
          <Source key="http://feeds.feedburner.com/apmlspec" name="APML.org" value="1.00"
                  type="application/rss+xml" from="GatheringTool.com"
                  updated="2007-03-11T01:55:00Z">
            <Author key="Sample" value="0.5" from="GatheringTool.com"
                    updated="2007-03-11T01:55:00Z"/>
          </Source>
        </Sources>
      </ImplicitData>
      <ExplicitData>
        <Concepts>
          <Concept key="direct attention" value="0.99"/>
        </Concepts>
      </ExplicitData>
    </Profile>
    <Profile name="Work">
      <ImplicitData/>
      <ExplicitData/>
    </Profile>
    <Applications>
      <Application name="sample.com">
        <SampleAppEl />
      </Application>
    </Applications>
  </Body>
</APML>"#;

    #[test]
    fn test_apml_06_profiles() {
        let doc = Document::parse(SAMPLE).unwrap();
        let apml = parse_apml_06(doc.root_element(), &LoadSettings::default()).unwrap();

        assert_eq!(apml.head.title.as_deref(), Some("Example APML file for apml.org"));
        assert!(apml.head.date_created.is_some());
        assert_eq!(apml.default_profile.as_deref(), Some("Work"));
        assert_eq!(apml.profiles.len(), 2);

        let home = &apml.profiles[0];
        assert_eq!(home.implicit.concepts.len(), 2);
        assert!((home.implicit.concepts[0].value - 0.99).abs() < f64::EPSILON);
        assert_eq!(home.implicit.sources[0].authors[0].key, "Sample");
        assert_eq!(home.explicit.concepts[0].key, "direct attention");
        assert!(apml.profiles[1].implicit.concepts.is_empty());
    }

    #[test]
    fn test_apml_applications_kept_as_data() {
        let doc = Document::parse(SAMPLE).unwrap();
        let apml = parse_apml_06(doc.root_element(), &LoadSettings::default()).unwrap();
        assert_eq!(apml.applications.len(), 1);
        assert_eq!(apml.applications[0].name, "sample.com");
        assert_eq!(apml.applications[0].data.len(), 1);
        assert_eq!(apml.applications[0].data[0].name, "SampleAppEl");
    }

    #[test]
    fn test_unnamespaced_apml() {
        let xml = r#"<APML version="0.6"><Head><Title>Bare</Title></Head>
            <Body><Profile name="Home"><ExplicitData><Concepts>
              <Concept key="rust" value="0.8"/>
            </Concepts></ExplicitData></Profile></Body></APML>"#;
        let doc = Document::parse(xml).unwrap();
        let apml = parse_apml_06(doc.root_element(), &LoadSettings::default()).unwrap();

        assert_eq!(apml.head.title.as_deref(), Some("Bare"));
        assert_eq!(apml.profiles.len(), 1);
        assert_eq!(apml.profiles[0].explicit.concepts[0].key, "rust");
    }

    #[test]
    fn test_missing_body_is_error() {
        let xml = r#"<APML xmlns="http://www.apml.org/apml-0.6" version="0.6"/>"#;
        let doc = Document::parse(xml).unwrap();
        let err = parse_apml_06(doc.root_element(), &LoadSettings::default()).unwrap_err();
        assert!(matches!(err, VariantError::MissingElement("Body")));
    }
}
