//! Doc-block tag extraction.
//!
//! # Responsibilities
//! - Strip comment decoration (`/**`, `*`, `*/`, `///`, `//`)
//! - Extract `@tagname value-until-end-of-line` entries
//! - Collect untagged leading text as the block description
//!
//! # Design Decisions
//! - A bare `@tag` is a flag (boolean true)
//! - Repeated tags accumulate into a list in declaration order
//! - Anything that is not a well-formed tag is skipped, never an error

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Value carried by a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Tag present with no trailing text.
    Flag,
    /// Single occurrence with text.
    Text(String),
    /// Repeated occurrences, in order. Flag occurrences appear as empty strings.
    List(Vec<String>),
}

impl TagValue {
    fn from_text(text: &str) -> Self {
        if text.is_empty() {
            TagValue::Flag
        } else {
            TagValue::Text(text.to_string())
        }
    }

    /// Fold another occurrence of the same tag into this value.
    fn accumulate(self, text: &str) -> Self {
        match self {
            TagValue::Flag => TagValue::List(vec![String::new(), text.to_string()]),
            TagValue::Text(first) => TagValue::List(vec![first, text.to_string()]),
            TagValue::List(mut all) => {
                all.push(text.to_string());
                TagValue::List(all)
            }
        }
    }

    /// First textual value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Flag => None,
            TagValue::Text(text) => Some(text),
            TagValue::List(all) => all.iter().find(|t| !t.is_empty()).map(String::as_str),
        }
    }

    /// All textual values, skipping flag occurrences.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            TagValue::Flag => Vec::new(),
            TagValue::Text(text) => vec![text.as_str()],
            TagValue::List(all) => all
                .iter()
                .filter(|t| !t.is_empty())
                .map(String::as_str)
                .collect(),
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagValue::Flag => serializer.serialize_bool(true),
            TagValue::Text(text) => serializer.serialize_str(text),
            TagValue::List(all) => {
                let mut seq = serializer.serialize_seq(Some(all.len()))?;
                for item in all {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Tag map extracted from a type or method annotation block.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Metadata {
    #[serde(flatten)]
    tags: IndexMap<String, TagValue>,
    #[serde(skip)]
    description: Option<String>,
}

impl Metadata {
    /// Create an empty tag map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an annotation block. Absent or malformed input yields an empty map.
    pub fn parse(block: &str) -> Self {
        let mut metadata = Metadata::new();
        let mut description: Vec<&str> = Vec::new();
        let mut seen_tag = false;

        for raw in block.lines() {
            let line = strip_decoration(raw);
            if line.is_empty() {
                continue;
            }

            if let Some((name, value)) = parse_tag(line) {
                seen_tag = true;
                metadata.push(name, value);
            } else if !seen_tag && !line.starts_with('@') {
                description.push(line);
            }
        }

        if !description.is_empty() {
            metadata.description = Some(description.join(" "));
        }
        metadata
    }

    /// Record one occurrence of `name`.
    pub fn push(&mut self, name: &str, value: &str) {
        match self.tags.get_mut(name) {
            Some(existing) => {
                let current = std::mem::replace(existing, TagValue::Flag);
                *existing = current.accumulate(value);
            }
            None => {
                self.tags.insert(name.to_string(), TagValue::from_text(value));
            }
        }
    }

    /// Builder-style variant of [`Metadata::push`].
    pub fn with_tag(mut self, name: &str, value: &str) -> Self {
        self.push(name, value);
        self
    }

    /// Overlay `overrides` on top of this map. Keys present in both take the
    /// overriding value but keep their original position.
    pub fn merged_with(&self, overrides: &Metadata) -> Metadata {
        let mut merged = self.clone();
        for (name, value) in &overrides.tags {
            merged.tags.insert(name.clone(), value.clone());
        }
        if overrides.description.is_some() {
            merged.description = overrides.description.clone();
        }
        merged
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// First text value of `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TagValue::as_text)
    }

    /// Untagged text preceding the first tag.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

fn strip_decoration(line: &str) -> &str {
    let mut s = line.trim();
    for opener in ["/**", "/*!", "/*", "///", "//!", "//"] {
        if let Some(rest) = s.strip_prefix(opener) {
            s = rest;
            break;
        }
    }
    if let Some(rest) = s.strip_suffix("*/") {
        s = rest;
    }
    s = s.trim_start();
    if let Some(rest) = s.strip_prefix('*') {
        s = rest;
    }
    s.trim()
}

fn parse_tag(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('@')?;
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (name, value) = rest.split_at(end);

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then(|| (name, value.trim()))
}
