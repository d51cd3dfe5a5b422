//! Structured-content document tree.
//!
//! Serializes to the nested `{"tag", "content", "style"}` objects that the
//! reader's structured-content definitions expect.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementTag {
    Div,
    Span,
}

/// Inline CSS subset understood by the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<&'static str>,
}

impl Style {
    pub const NONE: Style = Style {
        font_size: None,
        color: None,
        font_weight: None,
        font_style: None,
        margin_top: None,
        margin_bottom: None,
        text_align: None,
    };
}

/// A child of an [`Element`]: plain text or a nested element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Element(Element),
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Element> for Content {
    fn from(element: Element) -> Self {
        Content::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    tag: ElementTag,
    content: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<Style>,
}

impl Element {
    pub fn new(tag: ElementTag, content: Vec<Content>, style: Option<Style>) -> Self {
        Self {
            tag,
            content,
            style,
        }
    }

    /// Unstyled container.
    pub fn div(children: Vec<Element>) -> Self {
        Self::new(
            ElementTag::Div,
            children.into_iter().map(Content::Element).collect(),
            None,
        )
    }

    /// Block holding a single styled line of text.
    pub fn line(text: impl Into<String>, style: Style) -> Self {
        Self::new(ElementTag::Div, vec![Content::Text(text.into())], Some(style))
    }

    pub fn span(text: impl Into<String>, style: Style) -> Self {
        Self::new(ElementTag::Span, vec![Content::Text(text.into())], Some(style))
    }

    pub fn tag(&self) -> ElementTag {
        self.tag
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Nested elements, skipping bare text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    /// All text in document order, concatenated.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for content in &self.content {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Element(element) => element.collect_text(out),
            }
        }
    }
}
