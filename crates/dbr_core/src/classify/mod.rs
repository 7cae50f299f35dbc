use serde::{Deserialize, Serialize};

use crate::domain::{DocumentType, FieldDiagnostic};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub doc_type: DocumentType,
    pub diagnostics: Vec<FieldDiagnostic>,
}

fn from_filename(filename: &str) -> Option<DocumentType> {
    if filename.contains("DD_1414") || filename.contains("Base_for_Reprogramming") {
        return Some(DocumentType::Baseline);
    }
    if filename.contains("_IR_") || filename.contains("_PA_") {
        return Some(DocumentType::ReprogrammingAction);
    }
    None
}

fn from_content(text: &str) -> Option<DocumentType> {
    let upper = text.to_uppercase();
    // Baseline cues first: "BASE FOR REPROGRAMMING ACTIONS" contains the
    // reprogramming header as a substring.
    if upper.contains("BASE FOR REPROGRAMMING") || upper.contains("DD 1414") {
        return Some(DocumentType::Baseline);
    }
    if upper.contains("REPROGRAMMING ACTION") || upper.contains("EXPLANATION:") {
        return Some(DocumentType::ReprogrammingAction);
    }
    None
}

/// Determine the document subtype. Filename tokens are the primary signal;
/// section headers in the text are consulted when the filename is
/// inconclusive, and on disagreement the filename wins with a diagnostic
/// rather than a silent preference. `Unknown` is a valid terminal outcome.
pub fn classify(filename: &str, text: &str) -> Classification {
    let by_name = from_filename(filename);
    let by_content = from_content(text);

    let mut diagnostics = Vec::new();
    let doc_type = match (by_name, by_content) {
        (Some(n), Some(c)) => {
            if n != c {
                diagnostics.push(
                    FieldDiagnostic::new(
                        "document_type",
                        "CLASSIFY_SIGNAL_DISAGREEMENT",
                        "Filename and content classification disagree; filename wins",
                    )
                    .with_details(format!("filename={n:?}; content={c:?}; file={filename}")),
                );
            }
            n
        }
        (Some(n), None) => n,
        (None, Some(c)) => c,
        (None, None) => DocumentType::Unknown,
    };

    Classification {
        doc_type,
        diagnostics,
    }
}
