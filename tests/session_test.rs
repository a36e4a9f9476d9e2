mod common;

use clap::Parser;
use csvscope::registry::default_palette;
use csvscope::{AppConfig, Args, LabelMode, LoadOptions, LoadStage, Session};
use std::ffi::OsStr;
use std::path::Path;

fn parse_args(argv: &[&OsStr]) -> Args {
    Args::parse_from(std::iter::once(OsStr::new("csvscope")).chain(argv.iter().copied()))
}

fn load(session: &mut Session, path: &Path, options: &LoadOptions) {
    session.load_file(path, None, options);
}

#[test]
fn test_files_combine_into_one_name_list() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::write_csv(dir.path(), "a.csv", common::LOGGER_EXPORT);
    let b = common::write_csv(dir.path(), "b.csv", common::SEMICOLON_EXPORT);

    let mut session = Session::default();
    let options = LoadOptions::default();
    load(&mut session, &a, &options);
    load(&mut session, &b, &options);

    // Note is text, so it is not offered; "voltage" folds into "Voltage".
    assert_eq!(
        session.selection().available(),
        &["Voltage".to_string(), "Current".to_string(), "Temp".to_string()]
    );
    assert_eq!(session.selection().current(), Some("Voltage"));

    let payload = session.redraw();
    assert_eq!(payload.series.len(), 2);
    let palette = default_palette();
    assert_eq!(payload.series[0].label, "File 1");
    assert_eq!(payload.series[0].color, palette[0]);
    assert_eq!(payload.series[0].y, vec![1.0, 1.5, 2.0]);
    assert_eq!(payload.series[1].label, "File 2");
    assert_eq!(payload.series[1].color, palette[1]);
    assert_eq!(payload.series[1].column, "voltage");
    assert_eq!(payload.series[1].x, vec![0.0, 1.0]);
}

#[test]
fn test_switching_y_leaves_out_files_without_it() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::write_csv(dir.path(), "a.csv", common::LOGGER_EXPORT);
    let b = common::write_csv(dir.path(), "b.csv", common::SEMICOLON_EXPORT);

    let mut session = Session::default();
    let options = LoadOptions::default();
    load(&mut session, &a, &options);
    load(&mut session, &b, &options);

    assert!(session.select_y("TEMP"));
    let payload = session.redraw();
    assert_eq!(payload.y_name.as_deref(), Some("Temp"));
    assert_eq!(payload.series.len(), 1);
    assert_eq!(payload.series[0].label, "File 2");
    assert!(session.status().message.contains("1 file(s) without 'Temp'"));

    session.step_y(1);
    assert_eq!(session.selection().current(), Some("Voltage"));
    session.step_y(-1);
    assert_eq!(session.selection().current(), Some("Temp"));
}

#[test]
fn test_skip_rows_drops_rows_after_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_csv(dir.path(), "d.csv", "t,v\n0,10\n1,11\n2,12\n3,13\n");

    let mut session = Session::default();
    let options = LoadOptions {
        skip_rows: 2,
        ..LoadOptions::default()
    };
    load(&mut session, &path, &options);

    let payload = session.redraw();
    assert_eq!(payload.series[0].x, vec![2.0, 3.0]);
    assert_eq!(payload.series[0].y, vec![12.0, 13.0]);
}

#[test]
fn test_skipping_every_row_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_csv(dir.path(), "d.csv", "t,v\n0,10\n1,11\n");

    let mut session = Session::default();
    let options = LoadOptions {
        skip_rows: 5,
        ..LoadOptions::default()
    };
    load(&mut session, &path, &options);
    assert_eq!(session.last_error(), Some("empty_table"));
    assert!(session.registry().is_empty());
}

#[test]
fn test_comment_only_file_has_no_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_csv(dir.path(), "notes.csv", "# a comment\n# another, one\n");

    let mut session = Session::default();
    load(&mut session, &path, &LoadOptions::default());
    assert_eq!(session.last_error(), Some("header_not_found"));
    assert_eq!(session.stage(), LoadStage::Idle);
    assert!(session.status().is_error);
    assert!(session.status().message.contains("notes.csv"));
}

#[test]
fn test_gzip_file_is_decompressed_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_gzip(dir.path(), "a.csv.gz", common::LOGGER_EXPORT);

    let mut session = Session::default();
    let id = session.load_file(&path, None, &LoadOptions::default());
    assert!(id.is_some());
    assert_eq!(session.stage(), LoadStage::Rendered);
    assert_eq!(session.redraw().series[0].y.len(), 3);
}

#[test]
fn test_file_name_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_csv(dir.path(), "bench.csv", common::LOGGER_EXPORT);

    let mut session = Session::default();
    let options = LoadOptions {
        label_mode: LabelMode::FileName,
        ..LoadOptions::default()
    };
    load(&mut session, &path, &options);
    assert_eq!(session.redraw().series[0].label, "bench.csv");
}

#[test]
fn test_ids_keep_counting_after_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_csv(dir.path(), "a.csv", "t,v\n0,1\n");

    let mut session = Session::default();
    let first = session.load_file(&path, None, &LoadOptions::default());
    session.reset();
    let second = session.load_file(&path, None, &LoadOptions::default());
    assert_ne!(first, second);

    let dataset = session.registry().iter().next().unwrap();
    assert_eq!(dataset.label(), "File 1");
    assert_eq!(dataset.color(), default_palette()[0]);
}

#[test]
fn test_headless_json_export() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::write_csv(dir.path(), "a.csv", common::LOGGER_EXPORT);
    let b = common::write_csv(dir.path(), "b.csv", common::SEMICOLON_EXPORT);
    let out = dir.path().join("out.json");

    let args = parse_args(&[
        a.as_os_str(),
        b.as_os_str(),
        OsStr::new("--y"),
        OsStr::new("temp"),
        OsStr::new("--export-json"),
        out.as_os_str(),
    ]);
    assert!(args.is_headless());

    let session = csvscope::run_headless(&args, &AppConfig::default()).unwrap();
    assert_eq!(session.registry().len(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["y_name"], "Temp");
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["label"], "File 2");
    assert_eq!(series[0]["y"], serde_json::json!([20.0, 21.0]));
}

#[test]
fn test_headless_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = common::write_csv(dir.path(), "good.csv", "t,v\n0,1\n1,2\n");
    let bad = common::write_csv(dir.path(), "bad.csv", "no numbers here\n");
    let out = dir.path().join("out.json");

    let args = parse_args(&[
        bad.as_os_str(),
        good.as_os_str(),
        OsStr::new("--export-json"),
        out.as_os_str(),
    ]);
    let session = csvscope::run_headless(&args, &AppConfig::default()).unwrap();
    assert_eq!(session.registry().len(), 1);
    assert!(out.exists());
}
