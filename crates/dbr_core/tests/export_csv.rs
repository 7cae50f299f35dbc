use dbr_core::assemble::RecordAssembler;
use dbr_core::domain::{RawDocument, COLUMNS};
use dbr_core::export::write_records_csv;
use pretty_assertions::assert_eq;

#[test]
fn csv_has_fixed_quoted_header_and_one_row_per_record() {
    let assembler = RecordAssembler::default();
    let complete = assembler.assemble(&RawDocument::new(
        "25-08_IR_Depot.pdf",
        "ARMY INCREASE\nOperation and Maintenance, Army\nFY 2025\n$118,600 thousand\n",
        1,
    ));
    let incomplete = assembler.assemble(&RawDocument::new("scan_0001.pdf", "nothing recognizable", 1));
    assert!(!incomplete.complete);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("budget_data.csv");
    write_records_csv(&path, &[complete.clone(), incomplete]).expect("write csv");

    let contents = std::fs::read_to_string(&path).expect("read csv");
    let mut lines = contents.lines();

    let expected_header = COLUMNS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(",");
    assert_eq!(lines.next(), Some(expected_header.as_str()));

    // Incomplete records are emitted too, never silently dropped.
    assert_eq!(lines.count(), 2);

    let mut rdr = csv::ReaderBuilder::new().from_path(&path).expect("reopen");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 16);
    assert_eq!(&rows[0][3], "Army");
    assert_eq!(&rows[0][12], "118600");
    assert_eq!(&rows[0][15], "25-08_IR_Depot.pdf");
    // Unresolved fields surface as empty strings, not omissions.
    assert_eq!(&rows[1][3], "");
    assert_eq!(&rows[1][15], "scan_0001.pdf");
}
