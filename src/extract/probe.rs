//! Typed probes: one attempt at locating a value in a page

use super::document::{element_text, own_text, PageContext};
use super::patterns::{extract_sku, first_long_number};
use crate::normalize::Vocabulary;
use crate::url::product_id_from_url;
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde_json::Value;

/// How far a [`Probe::TextNode`] widens its view around a matching node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeScope {
    /// The text node itself
    Node,
    /// The full text of the node's parent element
    Parent,
}

/// A single location or heuristic that may hold a field value
///
/// Probes never fail: a probe that finds nothing returns `None` and the
/// extractor moves on to the next one.
#[derive(Debug)]
pub enum Probe {
    /// The previously extracted product title
    Title,

    /// Numeric product id embedded in the page URL
    UrlProductId,

    /// Value of an attribute on the first matching element
    Attribute {
        selector: Selector,
        attr: &'static str,
    },

    /// Text of the first matching element, or an attribute when the text is empty
    Css {
        selector: Selector,
        fallback_attr: Option<&'static str>,
    },

    /// Parent text of the first `tag` element whose own text matches `label`
    Label { tag: Selector, label: Regex },

    /// First block holding one of `keys`; object values are read through `nested`
    StructuredData {
        keys: &'static [&'static str],
        nested: Option<&'static str>,
    },

    /// First capture group of a regex over the visible page text
    Pattern { pattern: Regex },

    /// The whole visible page text
    PageText,

    /// First capture of `pattern` around text nodes matching `filter`
    TextNode {
        filter: Regex,
        pattern: Regex,
        scope: NodeScope,
    },

    /// Joined text of elements whose class attribute contains `needle`
    ClassContains {
        selector: Selector,
        needle: &'static str,
    },
}

impl Probe {
    /// Runs the probe against a page
    ///
    /// Returns trimmed, non-empty text or `None`.
    pub fn run(&self, page: &PageContext<'_>, title: Option<&str>) -> Option<String> {
        let value = match self {
            Self::Title => title.map(str::to_string),
            Self::UrlProductId => product_id_from_url(page.url()),
            Self::Attribute { selector, attr } => page
                .document()
                .select(selector)
                .find_map(|element| element.value().attr(attr))
                .map(str::to_string),
            Self::Css {
                selector,
                fallback_attr,
            } => page.select_first(selector).and_then(|element| {
                let text = element_text(element);
                if !text.is_empty() {
                    return Some(text);
                }
                fallback_attr
                    .and_then(|attr| element.value().attr(attr))
                    .map(str::to_string)
            }),
            Self::Label { tag, label } => page
                .document()
                .select(tag)
                .find(|element| label.is_match(&own_text(*element)))
                .and_then(|element| element.parent().and_then(ElementRef::wrap))
                .map(element_text),
            Self::StructuredData { keys, nested } => page
                .structured_data()
                .iter()
                .find_map(|block| keys.iter().find_map(|key| block.get(*key)))
                .and_then(|value| scalar_text(value, *nested)),
            Self::Pattern { pattern } => capture(pattern, page.page_text()),
            Self::PageText => Some(page.page_text().to_string()),
            Self::TextNode {
                filter,
                pattern,
                scope,
            } => page
                .document()
                .root_element()
                .descendants()
                .filter(|node| {
                    node.value()
                        .as_text()
                        .is_some_and(|text| filter.is_match(text))
                })
                .find_map(|node| match scope {
                    NodeScope::Node => node
                        .value()
                        .as_text()
                        .and_then(|text| capture(pattern, text.trim())),
                    NodeScope::Parent => node
                        .parent()
                        .and_then(ElementRef::wrap)
                        .and_then(|parent| capture(pattern, &element_text(parent))),
                }),
            Self::ClassContains { selector, needle } => {
                let texts: Vec<String> = page
                    .document()
                    .select(selector)
                    .filter(|element| {
                        element
                            .value()
                            .attr("class")
                            .is_some_and(|class| class.to_lowercase().contains(needle))
                    })
                    .map(element_text)
                    .filter(|text| !text.is_empty())
                    .collect();
                (!texts.is_empty()).then(|| texts.join(" | "))
            }
        };

        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Short name used in debug logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::UrlProductId => "url-product-id",
            Self::Attribute { .. } => "attribute",
            Self::Css { .. } => "css",
            Self::Label { .. } => "label",
            Self::StructuredData { .. } => "structured-data",
            Self::Pattern { .. } => "pattern",
            Self::PageText => "page-text",
            Self::TextNode { .. } => "text-node",
            Self::ClassContains { .. } => "class-contains",
        }
    }
}

/// Which vocabulary a refinement scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terms {
    Colors,
    Garments,
}

/// Post-processing applied to a probe hit before it is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refine {
    /// Accept the text unchanged
    Raw,
    /// Accept only a vocabulary term found in the text
    Vocabulary(Terms),
    /// A vocabulary term if one is found, otherwise the raw text
    VocabularyOrRaw(Terms),
    /// Accept only a SKU-shaped code found in the text
    Sku,
    /// A SKU-shaped code if one is found, otherwise the raw text
    SkuOrRaw,
    /// First run of 6 or more digits
    LongNumber,
    /// Prefix the text with the site SKU prefix
    Prefixed,
}

impl Refine {
    pub fn apply(&self, text: &str, vocabulary: &Vocabulary, sku_prefix: &str) -> Option<String> {
        let find = |terms: &Terms| match terms {
            Terms::Colors => vocabulary.find_color(text),
            Terms::Garments => vocabulary.find_garment(text),
        };

        match self {
            Self::Raw => Some(text.to_string()),
            Self::Vocabulary(terms) => find(terms).map(str::to_string),
            Self::VocabularyOrRaw(terms) => {
                Some(find(terms).map_or_else(|| text.to_string(), str::to_string))
            }
            Self::Sku => extract_sku(text),
            Self::SkuOrRaw => extract_sku(text).or_else(|| Some(text.to_string())),
            Self::LongNumber => first_long_number(text),
            Self::Prefixed => Some(format!("{}-{}", sku_prefix, text)),
        }
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Renders a structured-data value as text
///
/// Strings and numbers are used directly; objects are read through the
/// `nested` key when one is given.
fn scalar_text(value: &Value, nested: Option<&str>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => nested
            .and_then(|key| map.get(key))
            .and_then(|inner| scalar_text(inner, None)),
        _ => None,
    }
}
