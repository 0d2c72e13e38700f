//! Raw tracker task → fixed-column [`TaskRecord`].

use std::collections::HashSet;

use relsync_core::{CellValue, RowRules, TaskId, TaskRecord};

use crate::client::TaskSource;
use crate::error::TrackerError;
use crate::model::{RawTask, SearchPage};

/// Normalize one raw task for `release`.
pub fn normalize_task(release: &str, task: &RawTask, rules: &RowRules) -> TaskRecord {
    let component = task
        .component
        .as_deref()
        .and_then(<[_]>::first)
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let assignee = task
        .assignee
        .as_ref()
        .map(|p| p.first_name.clone())
        .unwrap_or_default();

    let status = rules.status_for(&assignee).to_owned();
    if let Some(tracker_status) = task.status.as_deref() {
        tracing::debug!(task = %task.number, tracker_status, status = %status, "status derived from assignee");
    }

    TaskRecord {
        release: release.to_owned(),
        task_id: TaskId::from(task.number.as_str()),
        name: task.name.clone(),
        component,
        status,
        priority: task.priority_id.map(|p| p - rules.priority_offset),
        estimation: String::new(),
        planned_start: first_date(task.gant_start_date.as_deref()),
        planned_end: first_date(task.gant_end_date.as_deref()),
        due_date: task
            .due_date
            .as_deref()
            .map_or(CellValue::Empty, CellValue::from_date_portion),
        assignee,
    }
}

fn first_date(values: Option<&[String]>) -> CellValue {
    values
        .and_then(<[_]>::first)
        .map_or(CellValue::Empty, |v| CellValue::from_date_portion(v))
}

/// Normalize a whole search page.
///
/// An empty page is an error: the run must stop rather than reconcile
/// against an empty tracker table. Repeated task numbers keep their first
/// occurrence.
pub fn normalize_page(
    release: &str,
    page: &SearchPage,
    rules: &RowRules,
) -> Result<Vec<TaskRecord>, TrackerError> {
    if page.content.is_empty() {
        return Err(TrackerError::EmptyRelease {
            release: release.to_owned(),
        });
    }

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(page.content.len());
    for task in &page.content {
        if !seen.insert(task.number.as_str()) {
            tracing::warn!(task = %task.number, "duplicate task number in tracker result, keeping first");
            continue;
        }
        rows.push(normalize_task(release, task, rules));
    }
    Ok(rows)
}

/// Fetch `release` from `source` and normalize it into the tracker table.
pub fn fetch_tracker_table<S: TaskSource + ?Sized>(
    source: &S,
    release: &str,
    rules: &RowRules,
) -> Result<Vec<TaskRecord>, TrackerError> {
    let page = source.search_release(release)?;
    let rows = normalize_page(release, &page, rules)?;
    tracing::info!(release, tasks = rows.len(), "fetched tracker tasks");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::model::{NamedRef, Person};

    fn rules() -> RowRules {
        RowRules {
            status_mapping: BTreeMap::from([
                ("Ann".to_owned(), "Разработка".to_owned()),
                ("Oleg".to_owned(), "Тестирование".to_owned()),
            ]),
            ..RowRules::default()
        }
    }

    fn raw(number: &str) -> RawTask {
        RawTask {
            number: number.to_owned(),
            name: format!("task {number}"),
            component: None,
            priority_id: None,
            assignee: None,
            due_date: None,
            gant_start_date: None,
            gant_end_date: None,
            status: None,
        }
    }

    #[test]
    fn takes_first_component() {
        let mut task = raw("T-1");
        task.component = Some(vec![
            NamedRef { name: "core".to_owned() },
            NamedRef { name: "ui".to_owned() },
        ]);
        assert_eq!(normalize_task("R", &task, &rules()).component, "core");

        task.component = Some(vec![]);
        assert_eq!(normalize_task("R", &task, &rules()).component, "");
    }

    #[test]
    fn gant_dates_are_truncated_to_date() {
        let mut task = raw("T-1");
        task.gant_start_date = Some(vec!["2025-04-01T09:00:00.000+0300".to_owned()]);
        task.gant_end_date = Some(vec![
            "2025-04-15T18:00:00.000+0300".to_owned(),
            "2025-05-01T18:00:00.000+0300".to_owned(),
        ]);
        let row = normalize_task("R", &task, &rules());
        assert_eq!(
            row.planned_start,
            CellValue::Date(NaiveDate::from_ymd_opt(2025, 4, 1).expect("date"))
        );
        assert_eq!(row.planned_end.to_string(), "04/15/2025");
        assert_eq!(row.due_date, CellValue::Empty);
    }

    #[test]
    fn absent_gant_dates_are_empty() {
        let row = normalize_task("R", &raw("T-1"), &rules());
        assert_eq!(row.planned_start, CellValue::Empty);
        assert_eq!(row.planned_end, CellValue::Empty);
    }

    #[test]
    fn priority_is_shifted_by_offset() {
        let mut task = raw("T-1");
        task.priority_id = Some(5);
        assert_eq!(normalize_task("R", &task, &rules()).priority, Some(3));
        task.priority_id = Some(1);
        assert_eq!(normalize_task("R", &task, &rules()).priority, Some(-1));
    }

    #[test]
    fn no_assignee_forces_backlog() {
        let mut task = raw("T-1");
        task.status = Some("inProgress".to_owned());
        let row = normalize_task("R", &task, &rules());
        assert_eq!(row.assignee, "");
        assert_eq!(row.status, "Бэклог");
    }

    #[test]
    fn mapped_assignee_overrides_tracker_status() {
        let mut task = raw("T-1");
        task.assignee = Some(Person { first_name: "Oleg".to_owned() });
        task.status = Some("done".to_owned());
        let row = normalize_task("R", &task, &rules());
        assert_eq!(row.assignee, "Oleg");
        assert_eq!(row.status, "Тестирование");
    }

    #[test]
    fn unknown_assignee_is_backlog() {
        let mut task = raw("T-1");
        task.assignee = Some(Person { first_name: "Zoe".to_owned() });
        assert_eq!(normalize_task("R", &task, &rules()).status, "Бэклог");
    }

    #[test]
    fn estimation_is_always_empty_and_release_is_stamped() {
        let row = normalize_task("OKR_1", &raw("T-1"), &rules());
        assert_eq!(row.estimation, "");
        assert_eq!(row.release, "OKR_1");
        assert_eq!(row.task_id, TaskId::from("T-1"));
    }

    #[test]
    fn empty_page_is_fatal() {
        let err = normalize_page("OKR_1", &SearchPage::default(), &rules()).unwrap_err();
        assert!(matches!(err, TrackerError::EmptyRelease { .. }), "got: {err}");
        assert!(err.to_string().contains("OKR_1"));
    }

    #[test]
    fn duplicate_numbers_keep_first() {
        let mut second = raw("T-1");
        second.name = "shadow".to_owned();
        let page = SearchPage {
            content: vec![raw("T-1"), raw("T-2"), second],
            total_elements: None,
        };
        let rows = normalize_page("R", &page, &rules()).expect("normalize");
        let ids: Vec<_> = rows.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, ["T-1", "T-2"]);
        assert_eq!(rows[0].name, "task T-1");
    }

    #[test]
    fn fetch_uses_source() {
        let page = SearchPage {
            content: vec![raw("T-9")],
            total_elements: Some(1),
        };
        let rows = fetch_tracker_table(&page, "R", &rules()).expect("fetch");
        assert_eq!(rows.len(), 1);
    }
}
