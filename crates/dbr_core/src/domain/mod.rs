use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fixed column set and order for the tabular sink. Two headers keep the
/// original space-separated spelling; downstream consumers match on these
/// strings bit-exact.
pub const COLUMNS: [&str; 16] = [
    "appropriation_category",
    "appropriation code",
    "appropriation activity",
    "branch",
    "fiscal_year_start",
    "fiscal_year_end",
    "budget_activity_number",
    "budget_activity_title",
    "pem",
    "budget_title",
    "program_base_congressional",
    "program_base_dod",
    "reprogramming_amount",
    "revised_program_total",
    "explanation",
    "file",
];

/// One document's recognized text plus provenance. Immutable after creation;
/// the id is a deterministic fingerprint of filename + text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawDocument {
    pub id: String,
    pub source_filename: String,
    pub recognized_text: String,
    pub page_count: u32,
}

impl RawDocument {
    pub fn new(source_filename: impl Into<String>, recognized_text: impl Into<String>, page_count: u32) -> Self {
        let source_filename = source_filename.into();
        let recognized_text = recognized_text.into();
        let payload = format!("doc|file={source_filename}|sha={}", hex::encode(Sha256::digest(recognized_text.as_bytes())));
        let id = hex::encode(Sha256::digest(payload.as_bytes()));
        Self {
            id,
            source_filename,
            recognized_text,
            page_count,
        }
    }
}

/// Closed branch enumeration. Tokens outside the known services map to `Other`
/// rather than passing free text through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Army,
    Navy,
    AirForce,
    MarineCorps,
    DefenseWide,
    Other,
}

impl Branch {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Branch::Army => "Army",
            Branch::Navy => "Navy",
            Branch::AirForce => "Air Force",
            Branch::MarineCorps => "Marine Corps",
            Branch::DefenseWide => "Defense-Wide",
            Branch::Other => "Other",
        }
    }

    /// Normalize a matched branch token. Whitespace runs are collapsed before
    /// comparison so OCR artifacts like `AIR  FORCE` still resolve.
    pub fn from_token(token: &str) -> Branch {
        let collapsed = token.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match collapsed.as_str() {
            "ARMY" => Branch::Army,
            "NAVY" => Branch::Navy,
            "AIR FORCE" => Branch::AirForce,
            "MARINE CORPS" | "MARINES" => Branch::MarineCorps,
            "DEFENSE-WIDE" | "DEFENSE WIDE" => Branch::DefenseWide,
            _ => Branch::Other,
        }
    }
}

/// Document subtype selected by the classifier. `Unknown` is a valid terminal
/// classification and routes extraction to the most permissive pattern set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Baseline,
    ReprogrammingAction,
    Unknown,
}

/// Canonical 16-field budget line. Unresolved fields stay `None` and are
/// emitted as empty strings, never omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetRecord {
    pub appropriation_category: Option<String>,
    pub appropriation_code: Option<String>,
    pub appropriation_activity: Option<String>,
    pub branch: Option<String>,
    pub fiscal_year_start: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub budget_activity_number: Option<String>,
    pub budget_activity_title: Option<String>,
    pub pem: Option<String>,
    pub budget_title: Option<String>,
    pub program_base_congressional: Option<String>,
    pub program_base_dod: Option<String>,
    pub reprogramming_amount: Option<String>,
    pub revised_program_total: Option<String>,
    pub explanation: Option<String>,
    pub file: String,
}

impl BudgetRecord {
    /// Row values in the fixed `COLUMNS` order.
    pub fn to_row(&self) -> [String; 16] {
        fn cell(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        [
            cell(&self.appropriation_category),
            cell(&self.appropriation_code),
            cell(&self.appropriation_activity),
            cell(&self.branch),
            cell(&self.fiscal_year_start),
            cell(&self.fiscal_year_end),
            cell(&self.budget_activity_number),
            cell(&self.budget_activity_title),
            cell(&self.pem),
            cell(&self.budget_title),
            cell(&self.program_base_congressional),
            cell(&self.program_base_dod),
            cell(&self.reprogramming_amount),
            cell(&self.revised_program_total),
            cell(&self.explanation),
            self.file.clone(),
        ]
    }
}

/// Non-fatal finding attached to a record. Diagnostics are data; they are never
/// raised as errors and never cause a record to be dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDiagnostic {
    pub field: String,
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl FieldDiagnostic {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Assembly output: the record, its completeness flag, and the diagnostic list
/// that downstream quality reporting is built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssembledRecord {
    pub record: BudgetRecord,
    pub complete: bool,
    pub diagnostics: Vec<FieldDiagnostic>,
}
