use std::sync::OnceLock;

use regex::Regex;

use crate::domain::DocumentType;

/// Field names the extraction engine recognizes. These match the record
/// columns; amount-typed fields additionally pass through the amount parser.
pub mod fields {
    pub const APPROPRIATION_CATEGORY: &str = "appropriation_category";
    pub const BRANCH: &str = "branch";
    pub const FISCAL_YEAR_START: &str = "fiscal_year_start";
    pub const FISCAL_YEAR_END: &str = "fiscal_year_end";
    pub const BUDGET_ACTIVITY_NUMBER: &str = "budget_activity_number";
    pub const BUDGET_ACTIVITY_TITLE: &str = "budget_activity_title";
    pub const PEM: &str = "pem";
    pub const BUDGET_TITLE: &str = "budget_title";
    pub const PROGRAM_BASE_CONGRESSIONAL: &str = "program_base_congressional";
    pub const PROGRAM_BASE_DOD: &str = "program_base_dod";
    pub const REPROGRAMMING_AMOUNT: &str = "reprogramming_amount";
    pub const REVISED_PROGRAM_TOTAL: &str = "revised_program_total";
    pub const EXPLANATION: &str = "explanation";
}

/// Post-match normalization applied to a fired pattern's capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Postprocess {
    None,
    /// Replace the match with a fixed canonical string.
    Canonical(&'static str),
    /// Map a branch token into the closed branch enumeration.
    NormalizeBranch,
    /// Expand 2-digit fiscal years to 20xx.
    ExpandFiscalYear,
    /// Collapse whitespace runs to single spaces and trim.
    CollapseWhitespace,
}

/// One ordered extraction rule. Rules targeting the same field are evaluated
/// in ascending `priority_rank`; the first firing rule wins.
#[derive(Debug)]
pub struct ExtractionPattern {
    pub field: &'static str,
    pub priority_rank: u32,
    pub matcher: Regex,
    pub postprocess: Postprocess,
}

impl ExtractionPattern {
    fn new(field: &'static str, priority_rank: u32, pattern: &str, postprocess: Postprocess) -> Self {
        Self {
            field,
            priority_rank,
            matcher: Regex::new(pattern).expect("static extraction pattern"),
            postprocess,
        }
    }
}

/// Amount token sub-pattern used inside labeled amount rules. Group-free so
/// callers can wrap it in a single capture.
const AMOUNT: &str = r"[+\-]?\$?\s*\(?\d{1,3}(?:,\d{3})*(?:\.\d+)?\)?(?:\s*(?:thousand|million|billion|[KMBkmb])\b)?";

fn category_patterns(out: &mut Vec<ExtractionPattern>) {
    use fields::APPROPRIATION_CATEGORY as F;
    use Postprocess::Canonical;
    out.push(ExtractionPattern::new(F, 10, r"(?i)Operation\s+and\s+Maintenance", Canonical("Operation and Maintenance")));
    out.push(ExtractionPattern::new(F, 20, r"(?i)Weapons?\s+Procurement", Canonical("Weapons Procurement")));
    out.push(ExtractionPattern::new(F, 30, r"(?i)Missile\s+Procurement", Canonical("Missile Procurement")));
    out.push(ExtractionPattern::new(F, 40, r"(?i)Other\s+Procurement", Canonical("Other Procurement")));
    out.push(ExtractionPattern::new(F, 50, r"(?i)Military\s+Personnel", Canonical("Military Personnel")));
    out.push(ExtractionPattern::new(F, 60, r"(?i)Reserve\s+Personnel", Canonical("Reserve Personnel")));
    out.push(ExtractionPattern::new(F, 70, r"(?i)\bRDTE\b|Research.{0,40}?Development", Canonical("RDTE")));
    out.push(ExtractionPattern::new(F, 80, r"(?i)\bProcurement\b", Canonical("Procurement")));
}

fn shared_patterns(out: &mut Vec<ExtractionPattern>) {
    use fields::*;
    category_patterns(out);

    // Appropriation line: "Operation and Maintenance, Army, 25/25 +21".
    out.push(ExtractionPattern::new(
        BRANCH,
        20,
        r"(?i)(?:Operation and Maintenance|Weapons Procurement|Missile Procurement|Other Procurement|Procurement|Research, Development, Test,? and Evaluation|Military Personnel|Reserve Personnel),?\s+(Army|Navy|Air\s+Force|Marine\s+Corps|Defense-Wide)",
        Postprocess::NormalizeBranch,
    ));

    out.push(ExtractionPattern::new(FISCAL_YEAR_START, 10, r"(?i)(?:FY|Fiscal\s+Year)\s*(\d{2,4})", Postprocess::ExpandFiscalYear));
    out.push(ExtractionPattern::new(FISCAL_YEAR_START, 20, r"\b(\d{2})/\d{2}\b", Postprocess::ExpandFiscalYear));

    out.push(ExtractionPattern::new(FISCAL_YEAR_END, 10, r"(?i)(?:FY|Fiscal\s+Year)\s*\d{2,4}\s*[/-]\s*(\d{2,4})\b", Postprocess::ExpandFiscalYear));
    out.push(ExtractionPattern::new(FISCAL_YEAR_END, 20, r"\b\d{2}/(\d{2})\b", Postprocess::ExpandFiscalYear));
    // A single fiscal year closes its own range.
    out.push(ExtractionPattern::new(FISCAL_YEAR_END, 30, r"(?i)(?:FY|Fiscal\s+Year)\s*(\d{2,4})", Postprocess::ExpandFiscalYear));

    out.push(ExtractionPattern::new(BUDGET_ACTIVITY_NUMBER, 10, r"(?i)Budget\s+Activity\s+(\d+)\s*:", Postprocess::None));
    out.push(ExtractionPattern::new(BUDGET_ACTIVITY_TITLE, 10, r"(?i)Budget\s+Activity\s+\d+\s*:\s*([^\n]+)", Postprocess::CollapseWhitespace));

    out.push(ExtractionPattern::new(PEM, 10, r"\b(\d{7}[A-Z])\b", Postprocess::None));
    out.push(ExtractionPattern::new(
        BUDGET_TITLE,
        10,
        r"(?m)^[ \t]*([A-Z][A-Za-z \t\-]+(?:\([^)\n]+\))?)[ \t]*$",
        Postprocess::CollapseWhitespace,
    ));
}

fn reprogramming_only(out: &mut Vec<ExtractionPattern>) {
    use fields::*;

    out.push(ExtractionPattern::new(
        BRANCH,
        10,
        r"(?i)\b(ARMY|NAVY|AIR\s+FORCE|DEFENSE-WIDE|MARINE\s+CORPS|COAST\s+GUARD)\b\s+(?:INCREASE|DECREASE)",
        Postprocess::NormalizeBranch,
    ));

    out.push(ExtractionPattern::new(
        PROGRAM_BASE_CONGRESSIONAL,
        10,
        &format!(r"(?i)Congressional\s+Action[^\n]*?({AMOUNT})"),
        Postprocess::None,
    ));
    out.push(ExtractionPattern::new(
        PROGRAM_BASE_DOD,
        10,
        &format!(r"(?i)Previously\s+Approved[^\n]*?({AMOUNT})"),
        Postprocess::None,
    ));
    out.push(ExtractionPattern::new(
        REPROGRAMMING_AMOUNT,
        10,
        &format!(r"(?i)Reprogramming\s+Action[^\n]*?({AMOUNT})"),
        Postprocess::None,
    ));
    // Explicitly signed or dollar-marked amounts outside a labeled row.
    out.push(ExtractionPattern::new(
        REPROGRAMMING_AMOUNT,
        20,
        r"([+\-]\s?\$?\d{1,3}(?:,\d{3})*(?:\.\d+)?)",
        Postprocess::None,
    ));
    out.push(ExtractionPattern::new(
        REPROGRAMMING_AMOUNT,
        30,
        r"(\(?\$\s*\d{1,3}(?:,\d{3})*(?:\.\d+)?\)?(?:\s*(?:thousand|million|billion|[KMBkmb])\b)?)",
        Postprocess::None,
    ));
    out.push(ExtractionPattern::new(
        REVISED_PROGRAM_TOTAL,
        10,
        &format!(r"(?i)Revised\s+Program[^\n]*?({AMOUNT})"),
        Postprocess::None,
    ));

    out.push(ExtractionPattern::new(
        EXPLANATION,
        10,
        r"(?is)Explanation:\s*(.+?)(?:\n\s*\n|\z)",
        Postprocess::CollapseWhitespace,
    ));
}

fn baseline_only(out: &mut Vec<ExtractionPattern>) {
    use fields::*;

    out.push(ExtractionPattern::new(
        BRANCH,
        10,
        r"(?i)DEPARTMENT\s+OF\s+THE\s+(ARMY|NAVY|AIR\s+FORCE)",
        Postprocess::NormalizeBranch,
    ));
    out.push(ExtractionPattern::new(BRANCH, 15, r"(?i)\b(DEFENSE-WIDE)\b", Postprocess::NormalizeBranch));

    out.push(ExtractionPattern::new(
        PROGRAM_BASE_CONGRESSIONAL,
        10,
        &format!(r"(?i)Congressional\s+Action[^\n]*?({AMOUNT})"),
        Postprocess::None,
    ));
    out.push(ExtractionPattern::new(
        REVISED_PROGRAM_TOTAL,
        10,
        &format!(r"(?i)Revised\s+Program[^\n]*?({AMOUNT})"),
        Postprocess::None,
    ));
}

fn sort_stable(mut v: Vec<ExtractionPattern>) -> Vec<ExtractionPattern> {
    // Stable sort: rules for one field keep their relative priority order and
    // iteration never depends on hash ordering.
    v.sort_by_key(|p| (p.field, p.priority_rank));
    v
}

fn baseline_set() -> &'static [ExtractionPattern] {
    static SET: OnceLock<Vec<ExtractionPattern>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut v = Vec::new();
        baseline_only(&mut v);
        shared_patterns(&mut v);
        sort_stable(v)
    })
}

fn reprogramming_set() -> &'static [ExtractionPattern] {
    static SET: OnceLock<Vec<ExtractionPattern>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut v = Vec::new();
        reprogramming_only(&mut v);
        shared_patterns(&mut v);
        sort_stable(v)
    })
}

fn permissive_set() -> &'static [ExtractionPattern] {
    static SET: OnceLock<Vec<ExtractionPattern>> = OnceLock::new();
    SET.get_or_init(|| {
        // Union of both specialized sets; reprogramming rules first on rank ties.
        let mut v = Vec::new();
        reprogramming_only(&mut v);
        baseline_only(&mut v);
        shared_patterns(&mut v);
        sort_stable(v)
    })
}

/// The ordered rule list for a document subtype. `Unknown` gets the most
/// permissive set.
pub fn pattern_set(doc_type: DocumentType) -> &'static [ExtractionPattern] {
    match doc_type {
        DocumentType::Baseline => baseline_set(),
        DocumentType::ReprogrammingAction => reprogramming_set(),
        DocumentType::Unknown => permissive_set(),
    }
}
