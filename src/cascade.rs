//! Per-field fallback chains.
//!
//! A [`Cascade`] is an ordered list of pure matchers for one field label.
//! Matchers run in order and the first non-blank result wins. Later cascades
//! see the fields already extracted, which is how one physical number is kept
//! from filling two logical fields.

use crate::fields::FieldMap;
use crate::normalize::normalize;

/// Normalized OCR text plus its trimmed, non-empty lines.
#[derive(Debug, Clone)]
pub struct Scan {
    text: String,
    lines: Vec<String>,
}

impl Scan {
    /// Normalize `raw` and split it into lines.
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, lines }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line following index `i`, if any.
    pub fn line_after(&self, i: usize) -> Option<&str> {
        self.lines.get(i + 1).map(String::as_str)
    }
}

/// One matcher in a field's fallback chain.
pub type Step = fn(&Scan, &FieldMap) -> Option<String>;

/// Ordered matchers for a single field label.
pub struct Cascade {
    pub label: &'static str,
    pub steps: &'static [Step],
}

impl Cascade {
    pub const fn new(label: &'static str, steps: &'static [Step]) -> Self {
        Self { label, steps }
    }

    /// First non-blank result of the steps, in order.
    pub fn resolve(&self, scan: &Scan, found: &FieldMap) -> Option<String> {
        self.steps
            .iter()
            .filter_map(|step| step(scan, found))
            .find(|value| !value.trim().is_empty())
    }
}

/// Run every cascade in order, feeding earlier results to later ones.
pub fn run(scan: &Scan, cascades: &[Cascade]) -> FieldMap {
    let mut fields = FieldMap::new();
    for cascade in cascades {
        if let Some(value) = cascade.resolve(scan, &fields) {
            fields.insert(cascade.label, value);
        }
    }
    fields
}
