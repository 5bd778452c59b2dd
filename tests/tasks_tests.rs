mod common;

use branchdesk::db::models::{NewTask, NewUser};
use branchdesk::error::DeskError;
use branchdesk::filter::{FilterRequest, Period};
use branchdesk::tasks::TaskFilter;
use common::db_on;

fn task(title: &str, status: &str, owner: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        status: status.to_string(),
        owner: owner.to_string(),
        branch_id: Some(1),
        ..Default::default()
    }
}

#[test]
fn create_stamps_clock_time_and_nulls_blanks() {
    let db = db_on("2024-03-14");
    let mut new = task("Call supplier", "todo", "North");
    new.label = Some("  ".into());
    new.due_date = Some("2024-03-20".into());

    let created = db.create_task(&new).unwrap();
    assert_eq!(created.created_at, "2024-03-14 12:00:00");
    assert_eq!(created.label, None);
    assert_eq!(created.due_date.as_deref(), Some("2024-03-20"));
}

#[test]
fn create_requires_fields() {
    let db = db_on("2024-03-14");
    let err = db.create_task(&task("", "todo", "North")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeskError>(),
        Some(DeskError::MissingField("title"))
    ));

    let mut no_branch = task("Stocktake", "todo", "North");
    no_branch.branch_id = None;
    let err = db.create_task(&no_branch).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeskError>(),
        Some(DeskError::MissingField("branch_id"))
    ));
}

#[test]
fn list_is_scoped_to_owner() {
    let db = db_on("2024-03-14");
    db.create_task(&task("A", "todo", "North")).unwrap();
    db.create_task(&task("B", "todo", "South")).unwrap();
    db.create_task(&task("C", "done", "North")).unwrap();

    let north: Vec<String> = db
        .list_tasks(Some("North"))
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(north, vec!["C", "A"]);
    assert_eq!(db.list_tasks(None).unwrap().len(), 3);
}

#[test]
fn filter_combines_substring_exact_and_period() {
    let db = db_on("2024-03-14");
    let mut a = task("Quarterly REPORT", "Open", "North");
    a.label = Some("finance".into());
    db.create_task(&a).unwrap();
    db.create_task(&task("Report draft", "Done", "North")).unwrap();
    db.create_task(&task("Report", "Open", "South")).unwrap();

    let fields = TaskFilter {
        title: Some("report".into()),
        status: Some("Open".into()),
        description: Some("".into()),
        ..Default::default()
    };
    let found = db
        .filter_tasks(Some("North"), &fields.apply(FilterRequest::new(Period::Today)))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Quarterly REPORT");

    let yesterday = fields.apply(
        FilterRequest::from_params(Some("custom"), None, Some("2024-03-13"), None).unwrap(),
    );
    assert!(db.filter_tasks(Some("North"), &yesterday).unwrap().is_empty());
}

#[test]
fn update_and_delete_report_missing_rows() {
    let db = db_on("2024-03-14");
    let created = db.create_task(&task("A", "todo", "North")).unwrap();

    let updated = db
        .update_task(created.id, &task("A", "done", "North"))
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "done");
    assert_eq!(updated.created_at, created.created_at);

    assert!(db.update_task(9999, &task("X", "todo", "North")).unwrap().is_none());
    assert!(db.delete_task(created.id).unwrap());
    assert!(!db.delete_task(created.id).unwrap());
    assert!(db.get_task(created.id).unwrap().is_none());
}

#[test]
fn branches_come_from_users() {
    let db = db_on("2024-03-14");
    for (branch, email, id) in [("North", "a@x.com", 1), ("North", "b@x.com", 1), ("South", "c@x.com", 2)] {
        db.add_user(&NewUser {
            branch: branch.into(),
            email: email.into(),
            role: "staff".into(),
            branch_id: id,
        })
        .unwrap();
    }
    let branches = db.task_branches().unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].branch_name, "North");
    assert_eq!(branches[1].branch_id, 2);
}
