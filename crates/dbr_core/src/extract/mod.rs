use crate::domain::{Branch, DocumentType};
use crate::patterns::{pattern_set, ExtractionPattern, Postprocess};

/// Applies an ordered pattern set over raw text. Extraction is deterministic:
/// rules live in a fixed-order slice and the first firing rule for a field
/// wins, so identical text and configuration always yield identical output.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractionEngine {
    patterns: &'static [ExtractionPattern],
}

impl FieldExtractionEngine {
    pub fn for_document_type(doc_type: DocumentType) -> Self {
        Self {
            patterns: pattern_set(doc_type),
        }
    }

    /// `None` means no rule fired: an expected "unresolved field" outcome,
    /// not an error.
    pub fn extract(&self, text: &str, field: &str) -> Option<String> {
        for pattern in self.patterns.iter().filter(|p| p.field == field) {
            if let Some(found) = fire(pattern, text) {
                return Some(found);
            }
        }
        None
    }
}

fn fire(pattern: &ExtractionPattern, text: &str) -> Option<String> {
    let caps = pattern.matcher.captures(text)?;
    let matched = caps
        .get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default();

    let value = match pattern.postprocess {
        Postprocess::None => matched.trim().to_string(),
        Postprocess::Canonical(name) => name.to_string(),
        Postprocess::NormalizeBranch => Branch::from_token(matched).canonical_name().to_string(),
        Postprocess::ExpandFiscalYear => expand_fiscal_year(matched),
        Postprocess::CollapseWhitespace => matched.split_whitespace().collect::<Vec<_>>().join(" "),
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn expand_fiscal_year(token: &str) -> String {
    let t = token.trim();
    if t.len() == 2 && t.chars().all(|c| c.is_ascii_digit()) {
        format!("20{t}")
    } else {
        t.to_string()
    }
}
