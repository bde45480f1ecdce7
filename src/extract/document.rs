use crate::normalize::collapse_whitespace;
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;

static JSON_LD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Elements whose text never counts as visible page text
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed page plus lazily computed views shared by all probes
///
/// The full page text and the structured-data blocks are computed at most
/// once per page, however many probes ask for them.
pub struct PageContext<'a> {
    url: &'a str,
    document: Html,
    page_text: OnceCell<String>,
    blocks: OnceCell<Vec<Value>>,
}

impl<'a> PageContext<'a> {
    /// Parses an HTML document fetched from `url`
    pub fn parse(url: &'a str, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
            page_text: OnceCell::new(),
            blocks: OnceCell::new(),
        }
    }

    pub fn url(&self) -> &str {
        self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Returns the first element matching a selector
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// Visible text of the whole page, whitespace collapsed
    pub fn page_text(&self) -> &str {
        self.page_text.get_or_init(|| {
            let parts: Vec<&str> = self
                .document
                .root_element()
                .descendants()
                .filter_map(|node| match node.value() {
                    Node::Text(text) => {
                        let hidden = node.ancestors().any(|ancestor| {
                            ancestor
                                .value()
                                .as_element()
                                .is_some_and(|element| NON_TEXT_ELEMENTS.contains(&element.name()))
                        });
                        (!hidden).then_some(&**text)
                    }
                    _ => None,
                })
                .collect();
            collapse_whitespace(&parts.join(" "))
        })
    }

    /// All JSON objects found in `application/ld+json` script blocks
    ///
    /// Top-level arrays and `@graph` containers are flattened; anything that
    /// is not an object is ignored, and unparsable blocks are skipped.
    pub fn structured_data(&self) -> &[Value] {
        self.blocks.get_or_init(|| {
            self.document
                .select(&JSON_LD)
                .filter_map(|script| {
                    let raw: String = script.text().collect();
                    serde_json::from_str::<Value>(raw.trim()).ok()
                })
                .flat_map(flatten_block)
                .collect()
        })
    }
}

/// Text content of an element, text nodes joined by spaces and collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    let parts: Vec<&str> = element.text().collect();
    collapse_whitespace(&parts.join(" "))
}

/// Text held directly by an element, ignoring its child elements
pub fn own_text(element: ElementRef<'_>) -> String {
    let parts: Vec<&str> = element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
        .collect();
    collapse_whitespace(&parts.join(" "))
}

fn flatten_block(value: Value) -> Vec<Value> {
    let mut candidates = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    let graphs: Vec<Value> = candidates
        .iter()
        .filter_map(|item| item.get("@graph").and_then(Value::as_array))
        .flatten()
        .cloned()
        .collect();
    candidates.extend(graphs);

    candidates.retain(Value::is_object);
    candidates
}
