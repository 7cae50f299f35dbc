use std::sync::OnceLock;

use regex::Regex;

use crate::amount::{format_value, AmountParser, CanonicalUnit};
use crate::classify::classify;
use crate::domain::{AssembledRecord, BudgetRecord, FieldDiagnostic, RawDocument};
use crate::extract::FieldExtractionEngine;
use crate::patterns::fields;

/// Composes classification, field extraction, and amount parsing into one
/// canonical record per document. Assembly is a pure function of the document
/// plus the static pattern configuration: no retries, no blocking, and no
/// extraction outcome ever raises past this boundary.
#[derive(Debug, Clone, Copy)]
pub struct RecordAssembler {
    amounts: AmountParser,
}

const AMOUNT_FIELDS: [&str; 4] = [
    fields::PROGRAM_BASE_CONGRESSIONAL,
    fields::PROGRAM_BASE_DOD,
    fields::REPROGRAMMING_AMOUNT,
    fields::REVISED_PROGRAM_TOTAL,
];

const TEXT_FIELDS: [&str; 9] = [
    fields::APPROPRIATION_CATEGORY,
    fields::BRANCH,
    fields::FISCAL_YEAR_START,
    fields::FISCAL_YEAR_END,
    fields::BUDGET_ACTIVITY_NUMBER,
    fields::BUDGET_ACTIVITY_TITLE,
    fields::PEM,
    fields::BUDGET_TITLE,
    fields::EXPLANATION,
];

fn section_header_regex() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| {
        Regex::new(r"(?i)\b(?:ARMY|NAVY|AIR\s+FORCE|DEFENSE-WIDE|MARINE\s+CORPS|COAST\s+GUARD)\s+(INCREASE|DECREASE)\b")
            .expect("static section header pattern")
    })
}

/// Direction of the section an offset falls under: the nearest preceding
/// INCREASE/DECREASE header decides. No preceding header means no direction.
fn in_decrease_section(text: &str, pos: usize) -> bool {
    let mut decrease = false;
    for caps in section_header_regex().captures_iter(text) {
        let header = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        if header.start() > pos {
            break;
        }
        decrease = caps
            .get(1)
            .map(|d| d.as_str().eq_ignore_ascii_case("DECREASE"))
            .unwrap_or(false);
    }
    decrease
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::new(CanonicalUnit::Thousands)
    }
}

impl RecordAssembler {
    pub fn new(canonical: CanonicalUnit) -> Self {
        Self {
            amounts: AmountParser::new(canonical),
        }
    }

    pub fn assemble(&self, doc: &RawDocument) -> AssembledRecord {
        let classification = classify(&doc.source_filename, &doc.recognized_text);
        let engine = FieldExtractionEngine::for_document_type(classification.doc_type);
        let text = doc.recognized_text.as_str();

        let mut diagnostics = classification.diagnostics;
        let mut record = BudgetRecord {
            file: doc.source_filename.clone(),
            ..BudgetRecord::default()
        };

        for field in TEXT_FIELDS {
            let value = engine.extract(text, field);
            if value.is_none() {
                diagnostics.push(unresolved(field));
            }
            set_field(&mut record, field, value);
        }

        for field in AMOUNT_FIELDS {
            let value = match engine.extract(text, field) {
                None => {
                    diagnostics.push(unresolved(field));
                    None
                }
                Some(raw) => match self.amounts.parse(&raw) {
                    Ok(parsed) => {
                        let mut value = parsed.value;
                        // Section direction supplies the sign when the token
                        // itself carries none.
                        if field == fields::REPROGRAMMING_AMOUNT
                            && !parsed.is_negative
                            && !parsed.raw_text.contains('+')
                        {
                            let pos = text.find(raw.as_str()).unwrap_or(0);
                            if in_decrease_section(text, pos) {
                                value = -value;
                            }
                        }
                        Some(format_value(value))
                    }
                    Err(e) => {
                        diagnostics.push(
                            FieldDiagnostic::new(field, "AMOUNT_UNPARSEABLE", "Amount text did not parse")
                                .with_details(format!("raw={raw}; err={e}")),
                        );
                        None
                    }
                },
            };
            set_field(&mut record, field, value);
        }

        // Fields the known form layouts never label; they stay unresolved.
        diagnostics.push(unresolved("appropriation_code"));
        diagnostics.push(unresolved("appropriation_activity"));

        let has_amount = AMOUNT_FIELDS.iter().any(|f| get_field(&record, f).is_some());
        let complete = record.branch.is_some()
            && (record.fiscal_year_start.is_some() || record.fiscal_year_end.is_some())
            && has_amount;

        AssembledRecord {
            record,
            complete,
            diagnostics,
        }
    }
}

fn unresolved(field: &str) -> FieldDiagnostic {
    FieldDiagnostic::new(field, "FIELD_UNRESOLVED", "No extraction pattern fired")
}

fn set_field(record: &mut BudgetRecord, field: &str, value: Option<String>) {
    match field {
        fields::APPROPRIATION_CATEGORY => record.appropriation_category = value,
        fields::BRANCH => record.branch = value,
        fields::FISCAL_YEAR_START => record.fiscal_year_start = value,
        fields::FISCAL_YEAR_END => record.fiscal_year_end = value,
        fields::BUDGET_ACTIVITY_NUMBER => record.budget_activity_number = value,
        fields::BUDGET_ACTIVITY_TITLE => record.budget_activity_title = value,
        fields::PEM => record.pem = value,
        fields::BUDGET_TITLE => record.budget_title = value,
        fields::PROGRAM_BASE_CONGRESSIONAL => record.program_base_congressional = value,
        fields::PROGRAM_BASE_DOD => record.program_base_dod = value,
        fields::REPROGRAMMING_AMOUNT => record.reprogramming_amount = value,
        fields::REVISED_PROGRAM_TOTAL => record.revised_program_total = value,
        fields::EXPLANATION => record.explanation = value,
        _ => {}
    }
}

fn get_field<'a>(record: &'a BudgetRecord, field: &str) -> Option<&'a String> {
    match field {
        fields::PROGRAM_BASE_CONGRESSIONAL => record.program_base_congressional.as_ref(),
        fields::PROGRAM_BASE_DOD => record.program_base_dod.as_ref(),
        fields::REPROGRAMMING_AMOUNT => record.reprogramming_amount.as_ref(),
        fields::REVISED_PROGRAM_TOTAL => record.revised_program_total.as_ref(),
        _ => None,
    }
}
