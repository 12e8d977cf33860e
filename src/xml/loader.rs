use crate::config::LoadSettings;
use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, ParsingOptions};
use std::borrow::Cow;
use thiserror::Error;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Errors raised while turning raw bytes into a document handle.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Neither the override nor the declared encoding is one we decode.
    #[error("Unsupported character encoding: {0}")]
    UnsupportedEncoding(String),

    /// The bytes are not valid in the selected encoding.
    #[error("Document is not valid {encoding}: {reason}")]
    Decode {
        encoding: &'static str,
        reason: String,
    },

    /// The text is not well-formed XML, or exceeds the entity limit.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    fn from_label(label: &str) -> Result<Self, LoadError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "us-ascii" | "ascii" => Ok(Encoding::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Encoding::Latin1),
            _ => Err(LoadError::UnsupportedEncoding(label.to_string())),
        }
    }
}

/// Reads the `encoding` pseudo-attribute of the XML declaration, if any.
///
/// Only the first event is inspected: a declaration that is not at the very
/// start of the document is not a declaration.
pub fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => match decl.encoding()? {
            Ok(label) => Some(String::from_utf8_lossy(&label).into_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed encoding declaration");
                None
            }
        },
        _ => None,
    }
}

/// Decodes document bytes into text.
///
/// Encoding precedence: `settings.character_encoding`, then the prolog
/// declaration, then UTF-8. A UTF-8 byte order mark is always stripped.
pub fn decode<'b>(bytes: &'b [u8], settings: &LoadSettings) -> Result<Cow<'b, str>, LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let label = settings
        .character_encoding
        .clone()
        .or_else(|| declared_encoding(bytes))
        .unwrap_or_else(|| "utf-8".to_string());

    match Encoding::from_label(&label)? {
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| LoadError::Decode {
                encoding: "UTF-8",
                reason: e.to_string(),
            }),
        Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err(LoadError::Decode {
                encoding: "US-ASCII",
                reason: format!("non-ASCII byte at offset {}", offset),
            }),
            None => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| LoadError::Decode {
                    encoding: "US-ASCII",
                    reason: e.to_string(),
                }),
        },
        // ISO-8859-1 maps every byte to the code point of the same value
        Encoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
    }
}

/// Parses decoded text into a document handle.
///
/// DTDs are accepted (RSS 0.91 documents commonly carry the Netscape DOCTYPE)
/// but external subsets are never fetched. Internal entity expansion counts
/// toward `settings.entity_limit`.
pub fn parse<'input>(
    text: &'input str,
    settings: &LoadSettings,
) -> Result<Document<'input>, LoadError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    options.nodes_limit = settings.entity_limit;

    let document = Document::parse_with_options(text, options)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_encoding_read_from_prolog() {
        let xml = br#"<?xml version="1.0" encoding="ISO-8859-1"?><rss version="2.0"/>"#;
        assert_eq!(declared_encoding(xml).as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn test_declared_encoding_absent() {
        assert_eq!(declared_encoding(br#"<?xml version="1.0"?><rss/>"#), None);
        assert_eq!(declared_encoding(b"<rss/>"), None);
    }

    #[test]
    fn test_decode_defaults_to_utf8() {
        let text = decode("<title>caf\u{e9}</title>".as_bytes(), &LoadSettings::default()).unwrap();
        assert!(matches!(text, Cow::Borrowed(_)));
        assert!(text.contains('\u{e9}'));
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"<rss/>");
        assert_eq!(decode(&bytes, &LoadSettings::default()).unwrap(), "<rss/>");
    }

    #[test]
    fn test_decode_latin1_from_declaration() {
        let mut bytes = br#"<?xml version="1.0" encoding="iso-8859-1"?><t>caf"#.to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</t>");

        let text = decode(&bytes, &LoadSettings::default()).unwrap();
        assert!(text.ends_with("caf\u{e9}</t>"));
    }

    #[test]
    fn test_override_beats_declaration() {
        let mut bytes = br#"<?xml version="1.0" encoding="utf-8"?><t>"#.to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</t>");

        assert!(decode(&bytes, &LoadSettings::default()).is_err());
        let settings = LoadSettings::default().with_character_encoding("latin1");
        assert!(decode(&bytes, &settings).unwrap().contains('\u{e9}'));
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let settings = LoadSettings::default().with_character_encoding("us-ascii");
        let err = decode(&[b'<', 0xC3, 0xA9, b'>'], &settings).unwrap_err();
        assert!(matches!(err, LoadError::Decode { encoding: "US-ASCII", .. }));
    }

    #[test]
    fn test_unsupported_encoding() {
        let xml = br#"<?xml version="1.0" encoding="Shift_JIS"?><rss/>"#;
        let err = decode(xml, &LoadSettings::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedEncoding(ref label) if label == "Shift_JIS"));
    }

    #[test]
    fn test_parse_malformed_xml_error() {
        let result = parse("<rss version=\"2.0\"><channel>", &LoadSettings::default());
        assert!(matches!(result, Err(LoadError::Xml(_))));
    }

    #[test]
    fn test_parse_accepts_netscape_doctype() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE rss PUBLIC "-//Netscape Communications//DTD RSS 0.91//EN"
  "http://my.netscape.com/publish/formats/rss-0.91.dtd">
<rss version="0.91"><channel><title>t</title></channel></rss>"#;
        let doc = parse(xml, &LoadSettings::default()).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "rss");
    }

    #[test]
    fn test_entity_limit_rejects_expansion_bomb() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE rss [
  <!ENTITY a "<x/><x/><x/><x/><x/><x/><x/><x/><x/><x/>">
  <!ENTITY b "&a;&a;&a;&a;&a;&a;&a;&a;&a;&a;">
  <!ENTITY c "&b;&b;&b;&b;&b;&b;&b;&b;&b;&b;">
]>
<rss version="2.0">&c;</rss>"#;
        let settings = LoadSettings::default().with_entity_limit(500);
        assert!(matches!(parse(xml, &settings), Err(LoadError::Xml(_))));
    }

    #[test]
    fn test_external_entity_not_fetched() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE rss [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<rss version="2.0"><channel><title>&xxe;</title></channel></rss>"#;
        match parse(xml, &LoadSettings::default()) {
            Ok(doc) => {
                let text: String = doc.descendants().filter_map(|n| n.text()).collect();
                assert!(!text.contains("root:"), "External entity was expanded");
            }
            Err(_) => {
                // Rejection is also acceptable
            }
        }
    }
}
