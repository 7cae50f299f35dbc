use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// System-wide unit every parsed value is normalized into. Chosen once at
/// parser construction and applied uniformly; DD 1414 tables state amounts in
/// thousands of dollars, so `Thousands` is the default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalUnit {
    WholeDollars,
    Thousands,
}

impl CanonicalUnit {
    fn factor(&self) -> f64 {
        match self {
            CanonicalUnit::WholeDollars => 1.0,
            CanonicalUnit::Thousands => 1_000.0,
        }
    }

    fn as_amount_unit(&self) -> AmountUnit {
        match self {
            CanonicalUnit::WholeDollars => AmountUnit::Ones,
            CanonicalUnit::Thousands => AmountUnit::Thousand,
        }
    }
}

/// Unit detected on the raw token. Bare numbers carry no suffix and are read
/// as already being in the canonical unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AmountUnit {
    Ones,
    Thousand,
    Million,
    Billion,
}

impl AmountUnit {
    fn factor(&self) -> f64 {
        match self {
            AmountUnit::Ones => 1.0,
            AmountUnit::Thousand => 1_000.0,
            AmountUnit::Million => 1_000_000.0,
            AmountUnit::Billion => 1_000_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedAmount {
    pub raw_text: String,
    /// Value after normalization into the parser's canonical unit.
    pub value: f64,
    pub unit: AmountUnit,
    pub is_negative: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AmountParser {
    canonical: CanonicalUnit,
}

impl Default for AmountParser {
    fn default() -> Self {
        Self::new(CanonicalUnit::Thousands)
    }
}

fn token_regex() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| {
        Regex::new(
            r"(?i)(?P<open>\()?\s*(?P<sign>[+-])?\s*(?P<dollar>\$)?\s*(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(?:\s*(?P<unit>thousand|million|billion|[kmb])\b)?\s*(?P<close>\))?",
        )
        .expect("amount token regex")
    })
}

struct Candidate {
    raw: String,
    mantissa: f64,
    unit: Option<AmountUnit>,
    is_negative: bool,
    has_marker: bool,
}

impl AmountParser {
    pub fn new(canonical: CanonicalUnit) -> Self {
        Self { canonical }
    }

    pub fn canonical_unit(&self) -> CanonicalUnit {
        self.canonical
    }

    /// Parse the first amount token in `raw`, preferring tokens bearing an
    /// explicit marker (dollar sign, sign, parentheses, or unit suffix) over
    /// bare numbers.
    ///
    /// Failure is a normal outcome for non-amount text: callers record the
    /// reason and leave the field unset; this never aborts a batch.
    pub fn parse(&self, raw: &str) -> Result<ParsedAmount, AppError> {
        let mut first_bare: Option<Candidate> = None;

        for caps in token_regex().captures_iter(raw) {
            let num = match caps.name("num") {
                Some(m) => m.as_str(),
                None => continue,
            };
            let mantissa: f64 = match num.replace(',', "").parse() {
                Ok(v) => v,
                Err(_) => continue,
            };

            let unit = caps.name("unit").map(|m| match m.as_str().to_lowercase().as_str() {
                "k" | "thousand" => AmountUnit::Thousand,
                "m" | "million" => AmountUnit::Million,
                "b" | "billion" => AmountUnit::Billion,
                _ => AmountUnit::Ones,
            });

            let parenthesized = caps.name("open").is_some() && caps.name("close").is_some();
            let is_negative = parenthesized || caps.name("sign").map(|m| m.as_str()) == Some("-");
            let has_marker = parenthesized
                || caps.name("dollar").is_some()
                || caps.name("sign").is_some()
                || unit.is_some();

            let candidate = Candidate {
                raw: caps.get(0).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
                mantissa,
                unit,
                is_negative,
                has_marker,
            };

            if candidate.has_marker {
                return Ok(self.finish(candidate));
            }
            if first_bare.is_none() {
                first_bare = Some(candidate);
            }
        }

        match first_bare {
            Some(c) => Ok(self.finish(c)),
            None => Err(AppError::new("AMOUNT_UNPARSEABLE", "No amount token matched")
                .with_details(format!("raw={}", raw.trim()))),
        }
    }

    fn finish(&self, c: Candidate) -> ParsedAmount {
        let (unit, magnitude) = match c.unit {
            // Suffixed tokens scale into the canonical unit.
            Some(u) => (u, c.mantissa * u.factor() / self.canonical.factor()),
            // Bare tokens are already in the canonical unit.
            None => (self.canonical.as_amount_unit(), c.mantissa),
        };
        let value = if c.is_negative { -magnitude } else { magnitude };
        ParsedAmount {
            raw_text: c.raw,
            value,
            unit,
            is_negative: c.is_negative,
        }
    }
}

/// Render a canonical value for the tabular sink: integral values without a
/// fractional part, everything else as-is.
pub fn format_value(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}
