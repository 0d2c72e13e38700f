//! End-to-end passes over an in-memory sheet and a canned tracker page.

use std::collections::BTreeMap;

use relsync_core::Config;
use relsync_sfera::{SearchPage, TrackerError};
use relsync_sheets::MemorySheet;
use relsync_sync::pipeline::{self, SyncOptions};
use relsync_sync::{SyncError, Throttle};
use rstest::{fixture, rstest};

const RELEASE: &str = "OKR_20250406_ATM";

#[derive(Default)]
struct CountingThrottle {
    pauses: usize,
}

impl Throttle for CountingThrottle {
    fn pause(&mut self) {
        self.pauses += 1;
    }
}

#[fixture]
fn config() -> Config {
    let mut config = Config::template();
    config.rules.status_mapping = BTreeMap::from([
        ("Ann".to_owned(), "Разработка".to_owned()),
        ("Kim".to_owned(), "Тестирование".to_owned()),
    ]);
    config
}

fn page(tasks: serde_json::Value) -> SearchPage {
    serde_json::from_value(serde_json::json!({ "content": tasks })).expect("decode page")
}

fn header(config: &Config) -> Vec<String> {
    config.columns.ordered().iter().map(|s| (*s).to_owned()).collect()
}

/// Header, `rows` as (task, status, assignee), then a footer row.
fn release_sheet(config: &Config, rows: &[(&str, &str, &str)]) -> MemorySheet {
    let header = header(config);
    let mut values = vec![header.clone()];
    for (task, status, assignee) in rows {
        let mut row = vec![String::new(); header.len()];
        row[0] = RELEASE.to_owned();
        row[1] = (*task).to_owned();
        row[4] = (*status).to_owned();
        row[10] = (*assignee).to_owned();
        values.push(row);
    }
    let mut footer = vec![String::new(); header.len()];
    footer[0] = "ИТОГО".to_owned();
    values.push(footer);
    MemorySheet::with_rows("Релизы", values)
}

fn column(sheet: &MemorySheet, index: usize) -> Vec<String> {
    sheet.rows().iter().map(|r| r.get(index).cloned().unwrap_or_default()).collect()
}

#[rstest]
fn empty_sheet_gets_one_append_and_no_updates(config: Config) {
    let source = page(serde_json::json!([
        {"number": "T-1", "name": "Login", "assignee": {"firstName": "Ann"}}
    ]));
    let sheet = MemorySheet::with_rows("Релизы", vec![header(&config)]);
    let mut throttle = CountingThrottle::default();

    let report = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("sync");

    assert_eq!(report.plan.to_append.len(), 1);
    assert_eq!(report.plan.to_append[0].status, "Разработка");
    assert!(report.plan.to_update.is_empty());
    assert_eq!(report.appended.as_ref().map(|a| a.written), Some(1));
    assert_eq!(sheet.cell(1, 2).as_deref(), Some("T-1"));
    assert_eq!(sheet.cell(4, 2).as_deref(), Some("Разработка"));
}

#[rstest]
fn diverged_status_is_rewritten(config: Config) {
    let source = page(serde_json::json!([
        {"number": "T-2", "assignee": {"firstName": "Kim"}}
    ]));
    let sheet = release_sheet(&config, &[("T-2", "Разработка", "Ann")]);
    let mut throttle = CountingThrottle::default();

    let report = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("sync");

    assert!(report.plan.to_append.is_empty());
    assert_eq!(report.plan.to_update.len(), 1);
    assert_eq!(report.plan.to_update[0].task_id.as_str(), "T-2");
    assert_eq!(report.plan.to_update[0].status, "Тестирование");
    assert_eq!(sheet.cell(4, 2).as_deref(), Some("Тестирование"));
    assert_eq!(sheet.cell(10, 2).as_deref(), Some("Kim"));
}

#[rstest]
fn unassigned_task_is_backlog(config: Config) {
    let mut config = config;
    config.rules.status_mapping.insert(String::new(), "Разработка".to_owned());
    let source = page(serde_json::json!([{"number": "T-3", "status": "inProgress"}]));
    let sheet = release_sheet(&config, &[]);
    let mut throttle = CountingThrottle::default();

    let report = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("sync");
    assert_eq!(report.plan.to_append[0].status, "Бэклог");
}

#[rstest]
fn excluded_and_foreign_rows_are_not_updated(config: Config) {
    let source = page(serde_json::json!([
        {"number": "T-1", "assignee": {"firstName": "Kim"}},
        {"number": "T-2", "assignee": {"firstName": "Kim"}}
    ]));
    let sheet = release_sheet(&config, &[("T-1", "Готово", "Ann"), ("T-2", "Разработка", "Ann")]);
    let mut throttle = CountingThrottle::default();

    let report = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("sync");
    let updated: Vec<_> = report.plan.to_update.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(updated, ["T-2"]);
    assert_eq!(sheet.cell(4, 2).as_deref(), Some("Готово"));
}

#[rstest]
fn second_run_is_a_no_op(config: Config) {
    let source = page(serde_json::json!([
        {"number": "T-1", "assignee": {"firstName": "Ann"}, "dueDate": "2025-04-20"},
        {"number": "T-2", "assignee": {"firstName": "Kim"}},
        {"number": "T-3"}
    ]));
    let sheet = release_sheet(&config, &[("T-2", "Разработка", "Ann")]);
    let mut throttle = CountingThrottle::default();

    let first = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("first run");
    assert_eq!(first.plan.to_append.len(), 2);
    assert_eq!(first.plan.to_update.len(), 1);
    let inserts = sheet.insert_calls();
    let batches = sheet.batch_calls();

    let second = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("second run");
    assert!(second.plan.is_noop(), "second plan: {:?}", second.plan);
    assert_eq!(sheet.insert_calls(), inserts);
    assert_eq!(sheet.batch_calls(), batches);
    assert_eq!(column(&sheet, 1), ["Задача", "T-2", "T-1", "T-3", ""]);
}

#[rstest]
fn twenty_three_appends_pause_twice(config: Config) {
    let tasks: Vec<_> = (1..=23)
        .map(|i| serde_json::json!({"number": format!("T-{i}"), "assignee": {"firstName": "Ann"}}))
        .collect();
    let source = page(serde_json::Value::Array(tasks));
    let sheet = release_sheet(&config, &[]);
    let mut throttle = CountingThrottle::default();

    let report = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("sync");
    assert_eq!(report.appended.as_ref().map(|a| a.written), Some(23));
    assert_eq!(throttle.pauses, 2);
    assert_eq!(column(&sheet, 0).last().map(String::as_str), Some("ИТОГО"));
}

#[rstest]
fn disabled_phases_leave_sheet_untouched(config: Config) {
    let source = page(serde_json::json!([
        {"number": "T-1", "assignee": {"firstName": "Ann"}},
        {"number": "T-2", "assignee": {"firstName": "Kim"}}
    ]));
    let sheet = release_sheet(&config, &[("T-2", "Разработка", "Ann")]);
    let mut throttle = CountingThrottle::default();
    let options = SyncOptions {
        append: false,
        update: false,
    };

    let report = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, options).expect("sync");
    assert!(report.appended.is_none());
    assert!(report.updated.is_none());
    assert_eq!(report.plan.to_append.len(), 1);
    assert_eq!(sheet.insert_calls(), 0);
    assert_eq!(sheet.batch_calls(), 0);
}

#[rstest]
fn empty_tracker_result_aborts_before_touching_sheet(config: Config) {
    let source = page(serde_json::json!([]));
    let sheet = release_sheet(&config, &[("T-1", "Разработка", "Ann")]);
    let mut throttle = CountingThrottle::default();

    let err = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .unwrap_err();
    assert!(
        matches!(err, SyncError::Tracker(TrackerError::EmptyRelease { .. })),
        "got: {err}"
    );
    assert_eq!(sheet.insert_calls() + sheet.batch_calls(), 0);
}

#[rstest]
fn sheet_without_task_column_is_an_error(config: Config) {
    let source = page(serde_json::json!([{"number": "T-1"}]));
    let sheet = MemorySheet::with_rows("Релизы", vec![vec!["Релиз", "Статус"], vec![RELEASE, "x"]]);
    let mut throttle = CountingThrottle::default();

    let err = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .unwrap_err();
    assert!(matches!(err, SyncError::MissingColumn { .. }), "got: {err}");
}

#[rstest]
fn repeated_task_id_updates_the_active_row_once(config: Config) {
    let source = page(serde_json::json!([
        {"number": "T-1", "assignee": {"firstName": "Kim"}}
    ]));
    let sheet = release_sheet(&config, &[("T-1", "Готово", "Ann"), ("T-1", "Разработка", "Ann")]);
    let mut throttle = CountingThrottle::default();

    let first = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("first run");
    assert_eq!(first.updated.as_ref().map(|u| u.updated), Some(1));
    assert_eq!(column(&sheet, 4), ["Статус", "Готово", "Тестирование", ""]);
    assert_eq!(column(&sheet, 10), ["Исполнитель", "Ann", "Kim", ""]);

    let second = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .expect("second run");
    assert!(second.plan.is_noop(), "second plan: {:?}", second.plan);
}

#[rstest]
fn unreadable_sheet_names_the_read(config: Config) {
    let source = page(serde_json::json!([{"number": "T-1"}]));
    let sheet = release_sheet(&config, &[]);
    sheet.fail_reads();
    let mut throttle = CountingThrottle::default();

    let err = pipeline::run(&config, RELEASE, &source, &sheet, &mut throttle, SyncOptions::default())
        .unwrap_err();
    assert!(
        matches!(err, SyncError::Sheet { operation: "read rows", .. }),
        "got: {err}"
    );
    assert_eq!(sheet.insert_calls(), 0);
}
