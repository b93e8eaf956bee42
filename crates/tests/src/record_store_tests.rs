use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use classhub_db::models::{Grade, Record, Student, parse_lenient_date};
use classhub_db::store::{Filter, MemoryRecordStore, Operator, Query, RecordMap, RecordStore};
use classhub_db::StoreError;
use classhub_services::dao::{
    AssignmentDao, AssignmentInput, BaseDao, DaoError, EnrollmentDao, GradeDao, GradeInput,
    StudentDao, StudentInput,
};
use serde_json::json;

fn row(value: serde_json::Value) -> RecordMap {
    value.as_object().cloned().unwrap()
}

fn student_input(first: &str, last: &str) -> StudentInput {
    StudentInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{first}@school.test"),
        date_of_birth: NaiveDate::from_ymd_opt(2010, 1, 1),
        enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        status: Default::default(),
    }
}

#[tokio::test]
async fn memory_store_assigns_sequential_ids() {
    let store = MemoryRecordStore::new();
    let response = store
        .create_records("t", vec![row(json!({"a": 1})), row(json!({"a": 2}))])
        .await
        .unwrap();

    let ids: Vec<i64> = response.results.iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(response.all_succeeded());
    assert_eq!(store.count("t"), 2);
}

#[test]
fn lenient_dates() {
    let march_10 = NaiveDate::from_ymd_opt(2025, 3, 10);
    assert_eq!(parse_lenient_date("2025-03-10"), march_10);
    assert_eq!(parse_lenient_date("2025-03-10T23:30:00+02:00"), march_10);
    assert_eq!(parse_lenient_date("2025-03-10T08:00:00.000Z"), march_10);
    assert_eq!(parse_lenient_date("2025-03-10T08:00:00"), march_10);
    assert_eq!(parse_lenient_date(""), None);
    assert_eq!(parse_lenient_date("next tuesday"), None);
}

#[tokio::test]
async fn assignments_decode_with_loose_due_dates() {
    let mut seed = HashMap::new();
    seed.insert(
        "assignment_c".to_string(),
        vec![
            row(json!({"Name": "Blank", "due_date_c": "", "total_points_c": 10})),
            row(json!({"Name": "Stamped", "due_date_c": "2025-03-10T00:00:00Z", "total_points_c": 10})),
            row(json!({"Name": "Missing", "due_date_c": null, "total_points_c": 10})),
            row(json!({"Name": "Plain", "due_date_c": "2025-03-12", "total_points_c": 10})),
        ],
    );
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::with_seed(seed));
    let dao = AssignmentDao::new(store);

    let all = dao.list().await.unwrap();
    assert_eq!(all.len(), 4);
    let due = |name: &str| all.iter().find(|a| a.name == name).unwrap().due_date;
    assert_eq!(due("Blank"), None);
    assert_eq!(due("Missing"), None);
    assert_eq!(due("Stamped"), NaiveDate::from_ymd_opt(2025, 3, 10));
    assert_eq!(due("Plain"), NaiveDate::from_ymd_opt(2025, 3, 12));
}

#[tokio::test]
async fn memory_store_filters_orders_and_projects() {
    let store = MemoryRecordStore::new();
    store
        .create_records(
            "assignment_c",
            vec![
                row(json!({"Name": "Essay", "due_date_c": "2025-03-12", "total_points_c": 50})),
                row(json!({"Name": "Quiz", "due_date_c": "2025-03-10", "total_points_c": 10})),
                row(json!({"Name": "Lab", "due_date_c": "2025-03-20", "total_points_c": 30})),
            ],
        )
        .await
        .unwrap();

    let query = Query::new(&["Name"])
        .filter(Filter::gte("due_date_c", "2025-03-10"))
        .filter(Filter::lte("due_date_c", "2025-03-12"))
        .order_by("due_date_c", false);
    let rows = store.fetch_records("assignment_c", &query).await.unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r["Name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Quiz", "Essay"]);
    assert!(rows[0].contains_key("Id"));
    assert!(!rows[0].contains_key("due_date_c"));

    let query = Query::new(&[])
        .filter(Filter::new("total_points_c", Operator::GreaterThan, 20))
        .order_by("total_points_c", true)
        .limit(1);
    let rows = store.fetch_records("assignment_c", &query).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Name"], "Essay");

    let query = Query::new(&["Name"]).filter(Filter::contains("Name", "ss"));
    let rows = store.fetch_records("assignment_c", &query).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn memory_store_reports_per_record_failures() {
    let store = MemoryRecordStore::new();
    let response = store
        .update_records("t", vec![row(json!({"Id": 5, "a": 1})), row(json!({"a": 2}))])
        .await
        .unwrap();
    assert_eq!(response.failures().count(), 2);

    let response = store.delete_records("t", &[1]).await.unwrap();
    assert!(!response.all_succeeded());
}

#[tokio::test]
async fn offline_store_is_unavailable() {
    let store = MemoryRecordStore::new();
    store.set_available(false);

    assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
    let err = store
        .fetch_records("t", &Query::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    store.set_available(true);
    assert!(store.ping().await.is_ok());
}

#[tokio::test]
async fn seed_file_keeps_record_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    std::fs::write(
        &path,
        json!({
            "class_c": [
                {"Id": 10, "Name": "Algebra", "subject_c": "Math", "period_c": "1st", "room_c": "101"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let store = MemoryRecordStore::from_seed_file(&path).await.unwrap();
    let found = store
        .get_record_by_id("class_c", 10, &["Name".to_string()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["Name"], "Algebra");

    let created = store
        .create_records("class_c", vec![row(json!({"Name": "Biology"}))])
        .await
        .unwrap();
    assert_eq!(created.results[0].id, Some(11));
}

#[tokio::test]
async fn with_seed_builds_tables() {
    let mut seed = HashMap::new();
    seed.insert("t".to_string(), vec![row(json!({"Id": 3})), row(json!({}))]);
    let store = MemoryRecordStore::with_seed(seed);
    assert_eq!(store.count("t"), 2);
}

#[tokio::test]
async fn base_dao_round_trips_typed_records() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let students = StudentDao::new(store.clone());

    let created = students.create(student_input("Ada", "Lovelace")).await.unwrap();
    let id = created.id().unwrap();
    assert_eq!(created.name, "Ada Lovelace");

    let fetched = students.get(id).await.unwrap();
    assert_eq!(fetched.email, "ada@school.test");

    let missing = students.get(999).await.unwrap_err();
    assert!(matches!(missing, DaoError::NotFound));

    let base: &BaseDao<Student> = &students.base;
    assert_eq!(base.find_all().await.unwrap().len(), 1);
    assert!(base
        .find_one(vec![Filter::eq(Student::LAST_NAME, "Nobody")])
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn student_validation_rejects_bad_input() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let students = StudentDao::new(store);

    let mut input = student_input("Ada", "Lovelace");
    input.email = "not-an-email".to_string();
    assert!(matches!(
        students.create(input).await.unwrap_err(),
        DaoError::Validation(_)
    ));

    let mut input = student_input("  ", "Lovelace");
    input.first_name = "   ".to_string();
    assert!(matches!(
        students.create(input).await.unwrap_err(),
        DaoError::Validation(_)
    ));

    let mut input = student_input("Ada", "Lovelace");
    input.date_of_birth = None;
    assert!(matches!(
        students.create(input).await.unwrap_err(),
        DaoError::Validation(_)
    ));
}

#[tokio::test]
async fn assignment_requires_positive_points() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let assignments = AssignmentDao::new(store);

    let err = assignments
        .create(AssignmentInput {
            name: "Essay".to_string(),
            due_date: None,
            total_points: 0.0,
            category: Default::default(),
            class_id: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Validation(_)));
}

#[tokio::test]
async fn upsert_keeps_one_grade_per_key() {
    let store = Arc::new(MemoryRecordStore::new());
    let grades = GradeDao::new(store.clone());
    let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

    let input = |score| GradeInput {
        student_id: 1,
        assignment_id: 2,
        score,
    };
    let first = grades.save(input(Some(40.0)), today).await.unwrap();
    let second = grades.save(input(Some(45.0)), today).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.count(Grade::TABLE), 1);
    let all = grades.list(Some(1), None).await.unwrap();
    assert_eq!(all[0].score, Some(45.0));
    assert_eq!(all[0].submitted_date, Some(today));
}

#[tokio::test]
async fn upsert_removes_surplus_duplicates() {
    let store = Arc::new(MemoryRecordStore::new());
    let duplicate = row(json!({"student_id_c": 1, "assignment_id_c": 2, "score_c": 10}));
    store
        .create_records(Grade::TABLE, vec![duplicate.clone(), duplicate.clone(), duplicate])
        .await
        .unwrap();

    let grades = GradeDao::new(store.clone());
    let saved = grades
        .save(
            GradeInput {
                student_id: 1,
                assignment_id: 2,
                score: Some(20.0),
            },
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(saved.id, Some(1));
    assert_eq!(store.count(Grade::TABLE), 1);
}

#[tokio::test]
async fn concurrent_enrollments_do_not_duplicate() {
    let store = Arc::new(MemoryRecordStore::new());
    let enrollments = Arc::new(EnrollmentDao::new(store.clone()));

    let tasks = (0..8).map(|_| {
        let enrollments = enrollments.clone();
        tokio::spawn(async move { enrollments.enroll(1, 2).await })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(enrollments.class_ids_for_student(1).await.unwrap(), vec![2]);
    assert_eq!(enrollments.student_ids_for_class(2).await.unwrap(), vec![1]);
    assert_eq!(store.count("enrollment_c"), 1);
}

#[tokio::test]
async fn dao_surfaces_unavailable_store() {
    let store = Arc::new(MemoryRecordStore::new());
    let students = StudentDao::new(store.clone());
    store.set_available(false);

    let err = students.list(None).await.unwrap_err();
    assert!(err.is_unavailable());
}
