//! Element types for active text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, TextRange};

/// Kind of active element.
///
/// Serialized in its textual form: `mention`, `hashtag`, `url`, `email`
/// or `custom:<tag>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementKind {
    /// `@handle`
    Mention,
    /// `#tag`
    Hashtag,
    /// Web address
    Url,
    /// Email address
    Email,
    /// Host-registered pattern, identified by its tag
    Custom(String),
}

impl ElementKind {
    /// Create a custom kind.
    pub fn custom(tag: impl Into<String>) -> Self {
        ElementKind::Custom(tag.into())
    }

    /// Minimum-length threshold: raw matches whose length is at or below
    /// it are discarded.
    pub fn min_length(&self) -> usize {
        match self {
            ElementKind::Custom(_) => 1,
            _ => 2,
        }
    }

    /// Get the kind name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Mention => "mention",
            ElementKind::Hashtag => "hashtag",
            ElementKind::Url => "url",
            ElementKind::Email => "email",
            ElementKind::Custom(_) => "custom",
        }
    }

    /// Tag of a custom kind.
    pub fn custom_tag(&self) -> Option<&str> {
        match self {
            ElementKind::Custom(tag) => Some(tag),
            _ => None,
        }
    }

    /// Whether this kind accepts a caller filter.
    pub fn is_filterable(&self) -> bool {
        !matches!(self, ElementKind::Url)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Custom(tag) => write!(f, "custom:{tag}"),
            other => f.write_str(other.type_name()),
        }
    }
}

impl FromStr for ElementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(tag) = trimmed.strip_prefix("custom:") {
            if tag.is_empty() {
                return Err(Error::InvalidKind(s.to_string()));
            }
            return Ok(ElementKind::Custom(tag.to_string()));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "mention" => Ok(ElementKind::Mention),
            "hashtag" => Ok(ElementKind::Hashtag),
            "url" => Ok(ElementKind::Url),
            "email" => Ok(ElementKind::Email),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ElementKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.to_string()
    }
}

/// Recognized active element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Mention, without the `@`
    Mention {
        /// Handle text
        text: String,
    },

    /// Hashtag, without the `#`
    Hashtag {
        /// Tag text
        text: String,
    },

    /// Web address
    Url {
        /// Canonical, scheme-qualified and untruncated
        original: String,
        /// Form embedded in the visible text, possibly truncated
        display: String,
    },

    /// Email address
    Email {
        /// Address text
        text: String,
    },

    /// Match of a host-registered pattern
    Custom {
        /// Tag of the custom kind
        tag: String,
        /// Matched text
        text: String,
    },
}

impl Element {
    /// Build a text element of the given kind.
    ///
    /// URL elements carry two strings; for [`ElementKind::Url`] the text
    /// is used as both `original` and `display`.
    pub fn create(kind: &ElementKind, text: impl Into<String>) -> Self {
        let text = text.into();
        match kind {
            ElementKind::Mention => Element::Mention { text },
            ElementKind::Hashtag => Element::Hashtag { text },
            ElementKind::Email => Element::Email { text },
            ElementKind::Custom(tag) => Element::Custom {
                tag: tag.clone(),
                text,
            },
            ElementKind::Url => Element::Url {
                original: text.clone(),
                display: text,
            },
        }
    }

    /// Get the kind of this element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Mention { .. } => ElementKind::Mention,
            Element::Hashtag { .. } => ElementKind::Hashtag,
            Element::Url { .. } => ElementKind::Url,
            Element::Email { .. } => ElementKind::Email,
            Element::Custom { tag, .. } => ElementKind::Custom(tag.clone()),
        }
    }

    /// Semantic text of the element (`original` for URLs).
    pub fn text(&self) -> &str {
        match self {
            Element::Mention { text } => text,
            Element::Hashtag { text } => text,
            Element::Url { original, .. } => original,
            Element::Email { text } => text,
            Element::Custom { text, .. } => text,
        }
    }

    /// Get the element type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Mention { .. } => "mention",
            Element::Hashtag { .. } => "hashtag",
            Element::Url { .. } => "url",
            Element::Email { .. } => "email",
            Element::Custom { .. } => "custom",
        }
    }
}

/// Element together with the text range it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementSpan {
    /// Range in the buffer produced by the scan
    pub range: TextRange,
    /// The element
    pub element: Element,
    /// Kind the span was extracted as
    pub kind: ElementKind,
}

impl ElementSpan {
    /// Create a new span.
    pub fn new(range: TextRange, element: Element, kind: ElementKind) -> Self {
        Self {
            range,
            element,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_min_length() {
        assert_eq!(ElementKind::Mention.min_length(), 2);
        assert_eq!(ElementKind::Hashtag.min_length(), 2);
        assert_eq!(ElementKind::Url.min_length(), 2);
        assert_eq!(ElementKind::Email.min_length(), 2);
        assert_eq!(ElementKind::custom("issue").min_length(), 1);
    }

    #[test]
    fn test_kind_display_and_parse() {
        let kinds = [
            ElementKind::Mention,
            ElementKind::Hashtag,
            ElementKind::Url,
            ElementKind::Email,
            ElementKind::custom("ticket"),
        ];

        for kind in kinds {
            let text = kind.to_string();
            assert_eq!(text.parse::<ElementKind>().unwrap(), kind);
        }

        assert_eq!(ElementKind::custom("ticket").to_string(), "custom:ticket");
        assert_eq!("URL".parse::<ElementKind>().unwrap(), ElementKind::Url);
    }

    #[test]
    fn test_kind_parse_invalid() {
        assert!("phone".parse::<ElementKind>().is_err());
        assert!("custom:".parse::<ElementKind>().is_err());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ElementKind::custom("pr")).unwrap();
        assert_eq!(json, "\"custom:pr\"");

        let kinds: Vec<ElementKind> = serde_json::from_str(r#"["mention","url"]"#).unwrap();
        assert_eq!(kinds, vec![ElementKind::Mention, ElementKind::Url]);
    }

    #[test]
    fn test_element_create() {
        assert_eq!(
            Element::create(&ElementKind::Mention, "john"),
            Element::Mention {
                text: "john".to_string()
            }
        );
        assert_eq!(
            Element::create(&ElementKind::custom("pr"), "PR-12"),
            Element::Custom {
                tag: "pr".to_string(),
                text: "PR-12".to_string()
            }
        );
    }

    #[test]
    fn test_element_kind_roundtrip() {
        let element = Element::create(&ElementKind::custom("pr"), "PR-12");
        assert_eq!(element.kind(), ElementKind::custom("pr"));
        assert_eq!(element.type_name(), "custom");
    }

    #[test]
    fn test_url_text_is_original() {
        let element = Element::Url {
            original: "https://example.com/a/b".to_string(),
            display: "example.com...".to_string(),
        };
        assert_eq!(element.text(), "https://example.com/a/b");
        assert_eq!(element.kind(), ElementKind::Url);
    }

    #[test]
    fn test_element_serialization() {
        let span = ElementSpan::new(
            TextRange::new(5, 10),
            Element::Hashtag {
                text: "rust".to_string(),
            },
            ElementKind::Hashtag,
        );

        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"type\":\"hashtag\""));
        let deserialized: ElementSpan = serde_json::from_str(&json).unwrap();
        assert_eq!(span, deserialized);
    }
}
