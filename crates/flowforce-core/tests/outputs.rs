use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use flowforce_core::outputs::{
    create_bundle, results_csv_bytes, results_dataframe, ASSUMPTIONS_FILE, PARAMETERS_FILE,
};
use flowforce_core::parameters::StructureParameters;
use flowforce_core::session::{process_file, EventSelection, FileFailure, ProcessedFile};
use zip::ZipArchive;

fn processed(name: &str, selection: &EventSelection) -> ProcessedFile {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../flowforce-parser/tests/data")
        .join(name);
    let content = fs::read(&path).expect("fixture readable");
    process_file(name, &content, selection, &StructureParameters::default()).expect("processing failed")
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut entry = archive
        .by_name(name)
        .unwrap_or_else(|err| panic!("missing {name}: {err}"));
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("utf-8 entry");
    text
}

#[test]
fn results_frame_keeps_source_columns_first() {
    let file = processed("flood_events.csv", &EventSelection::All);
    let df = results_dataframe(&file).expect("results frame");

    assert_eq!(df.height(), 4);
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names[0], "Tower ID");
    assert!(names.contains(&"1% AEP F1".to_string()));
    assert!(names.contains(&"PMF Flow+Log Moment".to_string()));

    let f1 = df.column("1% AEP F1").unwrap().f64().unwrap();
    assert!(f1.get(0).is_some());
    assert_eq!(f1.get(2), None);
}

#[test]
fn bundle_contains_results_parameters_and_assumptions() {
    let selection = EventSelection::parse("1% AEP");
    let files = vec![
        processed("flood_events.csv", &selection),
        processed("flood_events.xlsx", &selection),
    ];
    let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let bytes = create_bundle(&files, &[], &StructureParameters::default(), &selection, generated_at)
        .expect("bundle");

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    assert_eq!(archive.len(), 4);

    let csv = read_entry(&mut archive, "forces_results_flood_events.csv");
    let mut lines = csv.lines();
    let header = lines.next().expect("header row");
    assert!(header.starts_with("Tower ID,"));
    assert!(header.contains("1% AEP Overturning Moment"));
    let t003 = lines.nth(2).expect("T003 row");
    assert!(t003.starts_with("T003,"));
    assert!(t003.contains("N/A"));

    // second file with the same stem
    let xlsx_csv = read_entry(&mut archive, "forces_results_flood_events_2.csv");
    assert!(xlsx_csv.contains("Notes"));

    let manifest: serde_json::Value =
        serde_json::from_str(&read_entry(&mut archive, PARAMETERS_FILE)).expect("json");
    assert_eq!(manifest["events"], "1% AEP");
    assert_eq!(manifest["generated_at"], "2024-05-01T09:30:00+00:00");
    assert_eq!(manifest["parameters"]["load_factor"], 1.3);
    assert_eq!(manifest["parameters"]["shape"], "circular");
    assert_eq!(manifest["files"][1]["results"], "forces_results_flood_events_2.csv");
    assert!(manifest["failures"].as_array().unwrap().is_empty());

    let assumptions = read_entry(&mut archive, ASSUMPTIONS_FILE);
    assert!(assumptions.contains("AS 5100.2"));
    assert!(assumptions.contains("Technical assumptions:"));
}

fn column_names(file: &ProcessedFile) -> Vec<String> {
    results_dataframe(file)
        .expect("results frame")
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn repeated_event_in_selection_is_exported_once() {
    let selection = EventSelection::parse("PMF, PMF");
    let file = processed("flood_events.csv", &selection);
    assert_eq!(file.report.events.len(), 1);

    let names = column_names(&file);
    assert_eq!(names.iter().filter(|name| *name == "PMF F1").count(), 1);

    let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    create_bundle(&[file], &[], &StructureParameters::default(), &selection, generated_at)
        .expect("bundle");
}

#[test]
fn reprocessing_an_exported_results_sheet_replaces_result_columns() {
    let first = processed("flood_events.csv", &EventSelection::All);
    let exported = results_csv_bytes(&first).expect("results csv");

    let second = process_file(
        "forces_results_flood_events.csv",
        &exported,
        &EventSelection::All,
        &StructureParameters::default(),
    )
    .expect("reprocessing failed");
    assert_eq!(second.report.events.len(), 2);

    let first_names = column_names(&first);
    let second_names = column_names(&second);
    assert_eq!(second_names.len(), first_names.len());
    assert_eq!(second_names.iter().filter(|name| *name == "PMF F1").count(), 1);

    let df = results_dataframe(&second).expect("results frame");
    let f1 = df.column("1% AEP F1").unwrap().f64().unwrap();
    let expected = first.report.events[0].forces.results[0].forces().unwrap().water_flow.force_kn;
    assert_eq!(f1.get(0), Some(expected));

    let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    create_bundle(&[second], &[], &StructureParameters::default(), &EventSelection::All, generated_at)
        .expect("bundle");
}

#[test]
fn failed_uploads_are_listed_in_the_manifest() {
    let selection = EventSelection::All;
    let files = vec![processed("flood_events.csv", &selection)];
    let failures = vec![FileFailure {
        file_name: "photo.png".to_string(),
        error: "no parser could read the file".to_string(),
    }];
    let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let bytes = create_bundle(&files, &failures, &StructureParameters::default(), &selection, generated_at)
        .expect("bundle");

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let manifest: serde_json::Value =
        serde_json::from_str(&read_entry(&mut archive, PARAMETERS_FILE)).expect("json");
    assert_eq!(manifest["files"].as_array().unwrap().len(), 1);
    assert_eq!(manifest["failures"][0]["file_name"], "photo.png");
    assert_eq!(manifest["failures"][0]["error"], "no parser could read the file");
}
