use dbr_core::amount::{AmountParser, AmountUnit, CanonicalUnit};
use pretty_assertions::assert_eq;

#[test]
fn parenthesized_values_are_negative() {
    let parser = AmountParser::new(CanonicalUnit::Thousands);
    let parsed = parser.parse("(1,234.5)").expect("parse");
    assert_eq!(parsed.value, -1234.5);
    assert!(parsed.is_negative);
}

#[test]
fn unit_suffixes_scale_into_the_configured_canonical_unit() {
    let thousands = AmountParser::new(CanonicalUnit::Thousands);
    let parsed = thousands.parse("$2.3M").expect("parse");
    assert_eq!(parsed.value, 2300.0);
    assert_eq!(parsed.unit, AmountUnit::Million);
    assert!(!parsed.is_negative);

    let whole = AmountParser::new(CanonicalUnit::WholeDollars);
    let parsed = whole.parse("$2.3M").expect("parse");
    assert_eq!(parsed.value, 2_300_000.0);
}

#[test]
fn spelled_out_suffixes_parse_case_insensitively() {
    let parser = AmountParser::new(CanonicalUnit::Thousands);
    assert_eq!(parser.parse("118,600 Thousand").expect("parse").value, 118_600.0);
    assert_eq!(parser.parse("$5 BILLION").expect("parse").value, 5_000_000.0);
    assert_eq!(parser.parse("1.5k").expect("parse").value, 1.5);
}

#[test]
fn bare_numbers_are_read_as_already_canonical() {
    let parser = AmountParser::new(CanonicalUnit::Thousands);
    let parsed = parser.parse("+21").expect("parse");
    assert_eq!(parsed.value, 21.0);
    assert_eq!(parsed.unit, AmountUnit::Thousand);

    let parsed = parser.parse("-3,500").expect("parse");
    assert_eq!(parsed.value, -3500.0);
    assert!(parsed.is_negative);
}

#[test]
fn currency_marked_tokens_win_over_earlier_bare_numbers() {
    let parser = AmountParser::default();
    // "3" appears first but the dollar-marked token is the amount.
    let parsed = parser.parse("page 3 of 9: total $1,200K requested").expect("parse");
    assert_eq!(parsed.value, 1200.0);
    assert_eq!(parsed.unit, AmountUnit::Thousand);
}

#[test]
fn parenthesized_tokens_win_over_earlier_bare_numbers() {
    let parser = AmountParser::default();
    let parsed = parser.parse("Item 3 (1,234)").expect("parse");
    assert_eq!(parsed.value, -1234.0);
    assert!(parsed.is_negative);
}

#[test]
fn currency_symbols_commas_and_whitespace_are_stripped() {
    let parser = AmountParser::new(CanonicalUnit::Thousands);
    let parsed = parser.parse("  $ 1,000  ").expect("parse");
    assert_eq!(parsed.value, 1000.0);
}

#[test]
fn unparseable_text_fails_with_a_structured_error() {
    let parser = AmountParser::default();
    let err = parser.parse("classified - amount withheld").expect_err("no amount");
    assert_eq!(err.code, "AMOUNT_UNPARSEABLE");

    let err = parser.parse("").expect_err("empty");
    assert_eq!(err.code, "AMOUNT_UNPARSEABLE");
}

#[test]
fn unit_suffix_does_not_fire_inside_ordinary_words() {
    let parser = AmountParser::default();
    // "5 months" must not read "m" as millions.
    let parsed = parser.parse("5 months").expect("parse");
    assert_eq!(parsed.value, 5.0);
    assert_eq!(parsed.unit, AmountUnit::Thousand);
}
