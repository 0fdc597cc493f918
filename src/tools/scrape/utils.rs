use scraper::{ElementRef, Html, Node};
use serde_json::Value;

use crate::selectors::{
    BODY_SELECTOR, JSONLD_SELECTOR, LINK_SELECTOR, META_SELECTOR, TITLE_SELECTOR,
};
use crate::tools::types::{Jsonld, Metadata};

const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

pub(crate) fn jsonld_from(document: &Html) -> Jsonld {
    document
        .select(&JSONLD_SELECTOR)
        .filter_map(|el| {
            let raw = el.text().collect::<String>();
            parse_jsonld_block(&raw)
        })
        .flat_map(flatten_jsonld)
        .collect()
}

/// Parse one script body, tolerating the stray control characters CMSes emit.
fn parse_jsonld_block(raw: &str) -> Option<Value> {
    let trimmed = raw.trim().trim_end_matches(';');
    serde_json::from_str(trimmed).ok().or_else(|| {
        let sanitized: String = trimmed
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        serde_json::from_str(&sanitized).ok()
    })
}

fn flatten_jsonld(value: Value) -> Vec<Value> {
    match value {
        Value::Array(arr) => arr.into_iter().flat_map(flatten_jsonld).collect(),
        Value::Object(mut obj) => {
            if let Some(graph) = obj.remove("@graph") {
                return flatten_jsonld(graph);
            }
            vec![Value::Object(obj)]
        }
        _ => Vec::new(),
    }
}

pub(crate) fn metadata_from(document: &Html) -> Metadata {
    let mut tags = Vec::new();

    if let Some(el) = document.select(&TITLE_SELECTOR).next() {
        let text = el.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            tags.push(("title".to_string(), text));
        }
    }

    for el in document.select(&META_SELECTOR) {
        let key = el
            .value()
            .attr("name")
            .or_else(|| el.value().attr("property"))
            .map(|s| s.to_string());
        let value = el.value().attr("content").map(|s| s.to_string());
        if let (Some(k), Some(v)) = (key, value) {
            if !v.trim().is_empty() {
                tags.push((k, v));
            }
        }
    }

    tags
}

/// Text content of the body, skipping non-rendered subtrees.
pub(crate) fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());
    let mut out = String::new();
    collect_text(root, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if INVISIBLE_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

pub(crate) fn count_links(document: &Html) -> usize {
    document.select(&LINK_SELECTOR).count()
}
