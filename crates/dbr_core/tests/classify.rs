use dbr_core::classify::classify;
use dbr_core::domain::DocumentType;
use pretty_assertions::assert_eq;

#[test]
fn baseline_form_identifier_in_filename_wins() {
    let c = classify("FY25_DD_1414_Base_for_Reprogramming.pdf", "");
    assert_eq!(c.doc_type, DocumentType::Baseline);
    assert!(c.diagnostics.is_empty());
}

#[test]
fn action_code_prefixes_classify_as_reprogramming() {
    assert_eq!(
        classify("25-08_IR_Depot_Maintenance.pdf", "").doc_type,
        DocumentType::ReprogrammingAction
    );
    assert_eq!(
        classify("FY2024_PA_Omnibus.pdf", "").doc_type,
        DocumentType::ReprogrammingAction
    );
}

#[test]
fn content_headers_break_ties_when_filename_is_inconclusive() {
    let c = classify(
        "scan_0042.pdf",
        "ARMY INCREASE\nExplanation: funds are required for depot maintenance",
    );
    assert_eq!(c.doc_type, DocumentType::ReprogrammingAction);

    let c = classify("scan_0043.pdf", "DD 1414 Base for Reprogramming Actions");
    assert_eq!(c.doc_type, DocumentType::Baseline);
}

#[test]
fn disagreement_prefers_filename_and_records_a_diagnostic() {
    let c = classify(
        "FY25_DD_1414.pdf",
        "REPROGRAMMING ACTION\nExplanation: transferred funds",
    );
    assert_eq!(c.doc_type, DocumentType::Baseline);
    assert_eq!(c.diagnostics.len(), 1);
    assert_eq!(c.diagnostics[0].code, "CLASSIFY_SIGNAL_DISAGREEMENT");
    assert_eq!(c.diagnostics[0].field, "document_type");
}

#[test]
fn no_signal_is_a_valid_unknown_classification() {
    let c = classify("notes.pdf", "unrelated meeting minutes");
    assert_eq!(c.doc_type, DocumentType::Unknown);
    assert!(c.diagnostics.is_empty());
}
