//! Per-field probe lists, most reliable probe first

use super::probe::{NodeScope, Probe, Refine, Terms};
use super::ExtractError;
use regex::Regex;
use scraper::Selector;

/// One probe together with the refinement its hit must survive
#[derive(Debug)]
pub struct Step {
    pub probe: Probe,
    pub refine: Refine,
}

/// A named, ordered probe list for one field
#[derive(Debug)]
pub struct FieldExtractor {
    pub field: &'static str,
    pub steps: Vec<Step>,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector(format!("'{}': {:?}", css, e)))
}

fn regex(pattern: &str) -> Result<Regex, ExtractError> {
    Ok(Regex::new(pattern)?)
}

/// Text probes for each selector, sharing one refinement
fn css_steps(selectors: &[&str], refine: Refine) -> Result<Vec<Step>, ExtractError> {
    selectors
        .iter()
        .map(|css| {
            Ok(Step {
                probe: Probe::Css {
                    selector: selector(css)?,
                    fallback_attr: None,
                },
                refine,
            })
        })
        .collect()
}

fn css_with_attr(css: &str, attr: &'static str, refine: Refine) -> Result<Step, ExtractError> {
    Ok(Step {
        probe: Probe::Css {
            selector: selector(css)?,
            fallback_attr: Some(attr),
        },
        refine,
    })
}

pub fn identifier() -> Result<FieldExtractor, ExtractError> {
    Ok(FieldExtractor {
        field: "identifier",
        steps: vec![
            Step {
                probe: Probe::UrlProductId,
                refine: Refine::Prefixed,
            },
            Step {
                probe: Probe::Attribute {
                    selector: selector("[data-product-id]")?,
                    attr: "data-product-id",
                },
                refine: Refine::Prefixed,
            },
            Step {
                probe: Probe::StructuredData {
                    keys: &["productID", "sku"],
                    nested: None,
                },
                refine: Refine::Raw,
            },
        ],
    })
}

pub fn title() -> Result<FieldExtractor, ExtractError> {
    let mut steps = css_steps(
        &[
            r#"h1[itemprop="name"]"#,
            "h1.product-title",
            r#"h1[data-testid="product-title"]"#,
            "h1",
            ".product-title",
            "[data-product-title]",
        ],
        Refine::Raw,
    )?;
    steps.push(Step {
        probe: Probe::StructuredData {
            keys: &["name"],
            nested: None,
        },
        refine: Refine::Raw,
    });

    Ok(FieldExtractor {
        field: "title",
        steps,
    })
}

pub fn color() -> Result<FieldExtractor, ExtractError> {
    let refine = Refine::VocabularyOrRaw(Terms::Colors);
    let mut steps = vec![
        Step {
            probe: Probe::Title,
            refine: Refine::Vocabulary(Terms::Colors),
        },
        css_with_attr("[data-color-name]", "data-color-name", refine)?,
    ];
    steps.extend(css_steps(
        &[".color-option", ".product-color", r#"[data-testid="color"]"#],
        refine,
    )?);
    steps.push(Step {
        probe: Probe::Label {
            tag: selector("span")?,
            label: regex("(?i)color")?,
        },
        refine: Refine::Vocabulary(Terms::Colors),
    });
    steps.push(Step {
        probe: Probe::PageText,
        refine: Refine::Vocabulary(Terms::Colors),
    });

    Ok(FieldExtractor {
        field: "color",
        steps,
    })
}

pub fn garment_type() -> Result<FieldExtractor, ExtractError> {
    let refine = Refine::VocabularyOrRaw(Terms::Garments);
    let mut steps = vec![
        Step {
            probe: Probe::Title,
            refine: Refine::Vocabulary(Terms::Garments),
        },
        Step {
            probe: Probe::ClassContains {
                selector: selector("nav[class], ol[class], ul[class]")?,
                needle: "breadcrumb",
            },
            refine: Refine::Vocabulary(Terms::Garments),
        },
        css_with_attr("[data-product-type]", "data-product-type", refine)?,
    ];
    steps.extend(css_steps(
        &[".product-category", ".product-type", r#"[data-testid="category"]"#],
        refine,
    )?);

    Ok(FieldExtractor {
        field: "type",
        steps,
    })
}

pub fn brand() -> Result<FieldExtractor, ExtractError> {
    let mut steps = css_steps(
        &[r#"[itemprop="brand"]"#, ".product-brand", r#"[data-testid="brand"]"#],
        Refine::Raw,
    )?;
    steps.push(css_with_attr("[data-brand]", "data-brand", Refine::Raw)?);
    steps.push(Step {
        probe: Probe::StructuredData {
            keys: &["brand"],
            nested: Some("name"),
        },
        refine: Refine::Raw,
    });

    Ok(FieldExtractor {
        field: "brand",
        steps,
    })
}

pub fn sku() -> Result<FieldExtractor, ExtractError> {
    let mut steps = vec![css_with_attr("[data-sku]", "data-sku", Refine::SkuOrRaw)?];
    steps.extend(css_steps(
        &[".product-sku", r#"[data-testid="sku"]"#],
        Refine::SkuOrRaw,
    )?);
    steps.push(Step {
        probe: Probe::Label {
            tag: selector("span")?,
            label: regex("(?i)(SKU|Style)")?,
        },
        refine: Refine::Sku,
    });

    Ok(FieldExtractor { field: "sku", steps })
}

pub fn item_number() -> Result<FieldExtractor, ExtractError> {
    const ITEM: &str = r"(?i)Item\s*[#:]?\s*(\d{6,})";
    const ITEM_MENTION: &str = r"(?i)Item\s*[#:]?\s*\d+";

    // Page-wide label patterns, then text nodes, then their parents
    let mut steps = Vec::new();
    for pattern in [
        ITEM,
        r"(?i)Item\s*Number[:\s]+(\d{6,})",
        r"(?i)Item\s*ID[:\s]+(\d{6,})",
    ] {
        steps.push(Step {
            probe: Probe::Pattern {
                pattern: regex(pattern)?,
            },
            refine: Refine::Raw,
        });
    }
    for scope in [NodeScope::Node, NodeScope::Parent] {
        steps.push(Step {
            probe: Probe::TextNode {
                filter: regex(ITEM_MENTION)?,
                pattern: regex(ITEM)?,
                scope,
            },
            refine: Refine::Raw,
        });
    }

    steps.push(css_with_attr(
        "[data-item-number]",
        "data-item-number",
        Refine::LongNumber,
    )?);
    steps.push(css_with_attr("[data-item-id]", "data-item-id", Refine::LongNumber)?);
    steps.extend(css_steps(
        &[
            ".item-number",
            ".product-item-number",
            r#"[class*="item-number"]"#,
        ],
        Refine::LongNumber,
    )?);

    Ok(FieldExtractor {
        field: "item_number",
        steps,
    })
}

pub fn description() -> Result<FieldExtractor, ExtractError> {
    Ok(FieldExtractor {
        field: "description",
        steps: css_steps(
            &[
                r#"[itemprop="description"]"#,
                ".product-description",
                ".product-details",
                r#"[data-testid="description"]"#,
            ],
            Refine::Raw,
        )?,
    })
}
