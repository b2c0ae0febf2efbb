use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

// OCR engines return arbitrarily nested text: a string, a list of results,
// or an object keyed by field name. Deserialized untagged from the raw JSON.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NestedText {
    Text(String),
    Sequence(Vec<NestedText>),
    Mapping(BTreeMap<String, NestedText>),
}

impl NestedText {
    // Depth-first join of every leaf string with single spaces. Mapping
    // values are visited in map iteration order; the source gives no
    // ordering guarantee for object keys.
    pub fn flatten(&self) -> String {
        match self {
            NestedText::Text(text) => text.clone(),
            NestedText::Sequence(items) => items
                .iter()
                .map(NestedText::flatten)
                .collect::<Vec<_>>()
                .join(" "),
            NestedText::Mapping(entries) => entries
                .values()
                .map(NestedText::flatten)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

static REFERENCE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[A-Za-z]+[0-9]+").expect("Failed to compile reference token regex"));

// Heuristically pick a tracking-style token out of OCR output: letters
// immediately followed by digits, 8 characters total, first match wins.
// None means "no confident match"; callers fall back to a synthetic id.
pub fn find_reference_number(ocr_text: &NestedText) -> Option<String> {
    let flat_text = ocr_text.flatten();

    REFERENCE_TOKEN
        .find_iter(&flat_text)
        .map(|m| m.as_str())
        .find(|token| token.len() == 8)
        .map(|token| token.to_string())
}
