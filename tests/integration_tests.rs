use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use wq_processor::analyzers::{ChartBuilder, ChartKind, ReportAnalyzer};
use wq_processor::config::AppConfig;
use wq_processor::models::{RawTable, StationProfile, StationProfileConfig};
use wq_processor::processors::{BatchProcessor, StationPipeline, StationStatus};
use wq_processor::readers::RawReader;
use wq_processor::registry::StationRegistry;
use wq_processor::utils::constants::DEFAULT_PARAMETER_ORDER;
use wq_processor::utils::generate_default_export_filename;
use wq_processor::writers::{CsvExporter, ParquetStore, ReportStore, XlsxExporter};
use wq_processor::ProcessingError;

const LAB_EXPORT: &str = "\
Station_ID,Date_Time,PCode,Result
CT,2021-01-05T08:00:00,\"FLOW, IN\",10.0
CT,2021-01-05T14:00:00,\"FLOW, IN\",12.0
CT,2021-01-05T09:00:00,\"BOD, IN\",5.0
CT,2021-01-05T09:00:00,\"BOD, IN\",5.0
TUS,2021-01-05T10:00:00,\"PH, EFF\",7.4
XYZ,2021-01-05T10:00:00,\"PH, EFF\",7.0
CT,2021-02-11 07:30,\" TSS, EFF \",18
CT,garbage,\"TSS, EFF\",19
CT,2021-02-11 07:30,CHLORINE,0.5
,,,
TUS,2021-03-01,\"FLOW, IN\",
";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_export(contents: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[tokio::test]
async fn test_upload_to_store_to_export() {
    let dir = TempDir::new().unwrap();
    let export = write_export(LAB_EXPORT.as_bytes());

    let raw = RawReader::new().read_table(export.path()).unwrap();
    let store = Arc::new(ParquetStore::new(dir.path()));
    let processor = BatchProcessor::new(
        StationRegistry::with_defaults("water_analysis").unwrap(),
        Arc::clone(&store),
    );

    let report = processor.process_upload(&raw, None).await.unwrap();
    assert_eq!(report.stored(), 2);
    assert_eq!(report.skipped(), 1);

    match &report.outcome("CT").unwrap().status {
        StationStatus::Stored { rows, counts, .. } => {
            assert_eq!(*rows, 2);
            assert_eq!(counts.superseded_results, 1);
            assert_eq!(counts.unparseable_dates, 1);
            assert_eq!(counts.unknown_parameters, 1);
        }
        other => panic!("CT was not stored: {:?}", other),
    }

    let ct = store
        .query_by_date_range("water_analysis.ct_analysis", ymd(2021, 1, 1), ymd(2021, 12, 31))
        .unwrap();
    assert_eq!(ct.dates(), vec!["2021-01-05", "2021-02-11"]);
    assert_eq!(ct.rows()[0].value(1), Some(12.0));
    assert_eq!(ct.rows()[0].value(2), Some(5.0));
    assert_eq!(ct.rows()[1].value(8), Some(18.0));

    let tus = store
        .date_range("water_analysis.tus_analysis")
        .unwrap()
        .unwrap();
    assert_eq!(tus, (ymd(2021, 1, 5), ymd(2021, 3, 1)));

    let path = dir
        .path()
        .join(generate_default_export_filename("CT", ymd(2021, 1, 1), ymd(2021, 12, 31)));
    CsvExporter::new().write_to_path(&ct, &path).unwrap();
    let exported = RawReader::new().read_table(&path).unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(&exported.headers()[..3], &["Station", "Dates", "Data 1"]);
    assert_eq!(exported.value(0, 2), Some("12"));
}

#[tokio::test]
async fn test_reupload_replaces_table() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ParquetStore::new(dir.path()));
    let processor = BatchProcessor::new(
        StationRegistry::with_defaults("water_analysis").unwrap(),
        Arc::clone(&store),
    );

    let first = RawReader::new().read_bytes(LAB_EXPORT.as_bytes()).unwrap();
    processor.process_upload(&first, None).await.unwrap();

    let second = RawTable::from_str_rows(
        &["Station_ID", "Date_Time", "PCode", "Result"],
        &[&["CT", "2022-06-01", "PH, IN", "6.9"]],
    )
    .unwrap();
    processor.process_upload(&second, None).await.unwrap();

    let ct = store.read_table("water_analysis.ct_analysis").unwrap();
    assert_eq!(ct.dates(), vec!["2022-06-01"]);
    // TUS was absent from the second upload and keeps its table
    assert!(store.table_exists("water_analysis.tus_analysis").unwrap());
}

#[test]
fn test_ct_scenario_single_row() {
    let raw = RawTable::from_str_rows(
        &["Station_ID", "Date_Time", "PCode", "Result"],
        &[
            &["CT", "2021-01-05T08:00", "FLOW, IN", "10.0"],
            &["CT", "2021-01-05T14:00", "FLOW, IN", "12.0"],
            &["CT", "2021-01-05T09:00", "BOD, IN", "5.0"],
        ],
    )
    .unwrap();
    let profile = StationProfile::from_config(
        &StationProfileConfig::new("CT", &DEFAULT_PARAMETER_ORDER),
        "water_analysis",
    )
    .unwrap();

    let report = StationPipeline::new().process(&raw, &profile).unwrap();

    assert_eq!(report.table.len(), 1);
    let row = &report.table.rows()[0];
    assert_eq!(row.dates(), "2021-01-05");
    let mut expected = vec![None; 25];
    expected[0] = Some(12.0);
    expected[1] = Some(5.0);
    assert_eq!(row.values(), expected.as_slice());
}

#[test]
fn test_other_station_only_is_empty_input() {
    let raw = RawTable::from_str_rows(
        &["Station_ID", "Date_Time", "PCode", "Result"],
        &[&["XYZ", "2021-01-05", "FLOW, IN", "1"]],
    )
    .unwrap();
    let registry = StationRegistry::with_defaults("water_analysis").unwrap();

    let err = StationPipeline::new()
        .process(&raw, registry.resolve("CT").unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "No data found for CT station");
}

#[test]
fn test_windows_1252_export() {
    let mut bytes = b"Station_ID,Date_Time,PCode,Result,Comment\n".to_vec();
    bytes.extend_from_slice(b"CT,2021-01-05,\"TEMP, IN\",12.5,22\xb0C probe\n");
    let export = write_export(&bytes);

    let raw = RawReader::new().read_table(export.path()).unwrap();
    assert_eq!(raw.value(0, 4), Some("22°C probe"));

    let registry = StationRegistry::with_defaults("water_analysis").unwrap();
    let report = StationPipeline::new()
        .process(&raw, registry.resolve("CT").unwrap())
        .unwrap();
    assert_eq!(report.table.rows()[0].value(4), Some(12.5));
}

#[test]
fn test_configured_station_profile() {
    let config = AppConfig::from_toml_str(
        r#"
        [[stations]]
        station_id = "NORTH"
        parameter_order = ["PH, IN", "DO, IN"]
        "#,
    )
    .unwrap();
    let registry = StationRegistry::from_config(&config).unwrap();
    let raw = RawTable::from_str_rows(
        &["Station_ID", "Date_Time", "PCode", "Result"],
        &[
            &["NORTH", "2021-04-01", "DO, IN", "8.1"],
            &["NORTH", "2021-04-01", "PH, IN", "7.0"],
        ],
    )
    .unwrap();

    let report = StationPipeline::new()
        .process(&raw, registry.resolve("NORTH").unwrap())
        .unwrap();
    assert_eq!(report.table_id, "water_analysis.north_analysis");
    assert_eq!(report.table.columns(), &["Station", "Dates", "Data 1", "Data 2"]);
    assert_eq!(report.table.rows()[0].values(), &[Some(7.0), Some(8.1)]);
}

#[test]
fn test_analysis_and_chart_over_stored_report() {
    let dir = TempDir::new().unwrap();
    let store = ParquetStore::new(dir.path());
    let registry = StationRegistry::with_defaults("water_analysis").unwrap();
    let profile = registry.resolve("CT").unwrap();

    let raw = RawReader::new().read_bytes(LAB_EXPORT.as_bytes()).unwrap();
    let report = StationPipeline::new().process(&raw, profile).unwrap();
    store.overwrite(&report.table_id, &report.table).unwrap();
    let table = store.read_table(&report.table_id).unwrap();

    let summary = ReportAnalyzer::new().summarize(&table).unwrap();
    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.parameter_count, 25);
    assert_eq!(summary.populated_parameters, 3);

    let chart = ChartBuilder::new("bar".parse::<ChartKind>().unwrap())
        .build(&table, &["Data 1".to_string(), "Data 2".to_string()])
        .unwrap();
    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].y, vec![Some(12.0), None]);
}

#[test]
fn test_missing_result_column_rejected_before_grouping() {
    let raw = RawReader::new()
        .read_bytes(b"Station_ID,Date_Time,PCode\nCT,2021-01-05,\"FLOW, IN\"\n")
        .unwrap();
    let registry = StationRegistry::with_defaults("water_analysis").unwrap();

    let err = StationPipeline::new()
        .process(&raw, registry.resolve("CT").unwrap())
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Schema { .. }));
}

#[tokio::test]
async fn test_xlsx_upload_and_excel_export() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("lab_results.xlsx");

    let raw_csv = RawReader::new().read_bytes(LAB_EXPORT.as_bytes()).unwrap();
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in raw_csv.headers().iter().enumerate() {
        sheet.write_string(0, col as u16, header.as_str()).unwrap();
    }
    for row in 0..raw_csv.len() {
        for col in 0..raw_csv.headers().len() {
            if let Some(value) = raw_csv.value(row, col) {
                sheet.write_string(row as u32 + 1, col as u16, value).unwrap();
            }
        }
    }
    // A lab result stored as a number rather than text
    sheet.write_string(12, 0, "CT").unwrap();
    sheet.write_string(12, 1, "3/1/21 2:15 PM").unwrap();
    sheet.write_string(12, 2, "PH, IN").unwrap();
    sheet.write_number(12, 3, 7.25).unwrap();
    workbook.save(&upload).unwrap();

    let raw = RawReader::new().read_table(&upload).unwrap();
    let store = Arc::new(ParquetStore::new(dir.path().join("store")));
    let processor = BatchProcessor::new(
        StationRegistry::with_defaults("water_analysis").unwrap(),
        Arc::clone(&store),
    );
    let report = processor.process_upload(&raw, None).await.unwrap();
    assert_eq!(report.stored(), 2);

    let ct = store.read_table("water_analysis.ct_analysis").unwrap();
    assert_eq!(ct.dates(), vec!["2021-01-05", "2021-02-11", "2021-03-01"]);
    assert_eq!(ct.rows()[0].value(1), Some(12.0));
    assert_eq!(ct.rows()[2].value(5), Some(7.25));

    let export = dir.path().join("CT_filtered_data_2021-01-01_2021-12-31.xlsx");
    XlsxExporter::new().write_to_path(&ct, &export).unwrap();
    let exported = RawReader::new().read_table(&export).unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported.value(2, 1), Some("2021-03-01"));
}

#[test]
fn test_unsupported_upload_rejected() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("lab_results.json");
    std::fs::write(&upload, LAB_EXPORT).unwrap();

    let err = RawReader::new().read_table(&upload).unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidFormat(_)));
}
