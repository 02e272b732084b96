use riseclipse_e::e_output::CSV_HEADER;
use riseclipse_e::{MessageFilter, ParsedMessage, Severity, ValidatorOutput};

const RUN: &str = "\
DEBUG   [Setup] Loading nsd files (nsd/IEC_61850-7-4.nsd:1)
INFO    [Setup] Found 12 files, with \"quotes\" (nsd:0)
NOTICE  [SCL] Unused DataTypeTemplate LN0, ignored (ied.icd:300)
WARNING [Schema] Element is not expected (ied.icd:10)
ERROR   [NSD] DataObject Beh is missing (ied.icd:120)
ERROR   [NSD] DataObject Mod is missing (scd/station.scd:44)
";

#[test]
fn csv_export_reads_back_with_semicolons() {
    let result = ValidatorOutput::from_text(RUN);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("messages.csv");
    let written = result.to_csv(&path, b';').unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), written);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(&path)
        .unwrap();
    let header: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header, CSV_HEADER);
    let rows: Vec<ParsedMessage> = rdr.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows, result.all_messages());
    assert_eq!(rows[1].data, "Found 12 files, with \"quotes\"");
}

#[test]
fn empty_run_writes_no_csv() {
    let result = ValidatorOutput::from_text("\n\n");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("messages.csv");
    assert_eq!(result.to_csv(&path, b',').unwrap(), "");
    assert!(!path.exists());
}

#[test]
fn json_export_reads_back_in_order() {
    let result = ValidatorOutput::from_text(RUN);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("messages.json");
    let value = result.to_json(&path).unwrap();
    assert_eq!(value["4"]["severity"], "ERROR");
    assert_eq!(value["0"]["filename"], "nsd/IEC_61850-7-4.nsd");

    let back = ValidatorOutput::from_json(&path).unwrap();
    assert_eq!(back.all_messages(), result.all_messages());
    for severity in Severity::ALL {
        assert!(
            back.all_messages().iter().any(|m| m.severity == severity),
            "{} lost in JSON",
            severity
        );
    }
}

#[test]
fn tiers_are_nested() {
    let result = ValidatorOutput::from_text(RUN);
    let tiers = [
        result.errors(),
        result.warnings(),
        result.notices(),
        result.infos(),
    ];
    for pair in tiers.windows(2) {
        assert!(pair[0].len() <= pair[1].len());
        for m in pair[0] {
            assert!(pair[1].contains(m), "{} missing from wider tier", m.message);
        }
    }
    assert!(result.infos().len() < result.len());
    assert_eq!(
        result.only_warnings().len() + result.only_notices().len() + result.only_infos().len(),
        3
    );
}

#[test]
fn filters_combine_and_table_columns_line_up() {
    let result = ValidatorOutput::from_text(RUN);
    let filter = MessageFilter::new()
        .severity(Severity::Error)
        .category("NSD")
        .filename("ied.icd");
    let hits = result.by_filter(&filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, "120");
    assert_eq!(result.by_line(44).len(), 1);
    assert_eq!(result.by_message_text("is missing").len(), 2);

    let table = result.to_table();
    assert_eq!(table.len(), result.len());
    let severities = table.column("severity").unwrap();
    assert_eq!(severities.last(), Some(&"ERROR"));
    assert!(table.column("nope").is_none());
}
