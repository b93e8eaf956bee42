use chrono::Local;

use crate::fixtures::{seed::id_of, test_app::TestApp};

#[tokio::test]
async fn empty_dashboard() {
    let app = TestApp::spawn().await;

    let json = app.get_json("/api/dashboard").await;
    assert_eq!(json["stats"]["total_students"], 0);
    assert_eq!(json["stats"]["average_grade"], 0);
    assert_eq!(json["stats"]["attendance_rate"], 0);
    assert!(json["stats"]["today_attendance"].as_array().unwrap().is_empty());
    assert_eq!(json["overview"]["total_classes"], 0);
    assert_eq!(json["overview"]["average_class_size"], 0);
}

#[tokio::test]
async fn dashboard_aggregates_records() {
    let app = TestApp::spawn().await;
    let ada = id_of(&app.create_student("Ada", "Lovelace").await);
    let alan = id_of(&app.create_student("Alan", "Turing").await);
    let algebra = id_of(&app.create_class("Algebra", "Math").await);
    app.create_class("Biology", "Science").await;

    app.put_ok(
        &format!("/api/class/{}/student", algebra),
        serde_json::json!({ "student_ids": [ada, alan] }),
    )
    .await;

    let quiz = id_of(&app.create_assignment(algebra, "Quiz", None, 10.0).await);
    app.save_grade(ada, quiz, Some(9.0)).await;
    app.save_grade(alan, quiz, Some(7.0)).await;

    let today = Local::now().date_naive();
    app.mark_attendance(ada, algebra, today, "present").await;
    app.mark_attendance(alan, algebra, today, "absent").await;

    let json = app.get_json("/api/dashboard").await;
    let stats = &json["stats"];
    assert_eq!(stats["total_students"], 2);
    assert_eq!(stats["active_classes"], 2);
    assert_eq!(stats["average_grade"], 80);
    assert_eq!(stats["attendance_rate"], 50);

    let entries = stats["today_attendance"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["class_name"] == "Algebra"));

    let overview = &json["overview"];
    assert_eq!(overview["total_classes"], 2);
    assert_eq!(overview["subjects"], 2);
    assert_eq!(overview["total_enrollment"], 2);
    assert_eq!(overview["average_class_size"], 1);
}

#[tokio::test]
async fn health_reports_backend() {
    let app = TestApp::spawn().await;

    let json = app.get_json("/api/health").await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["record_store"]["backend"], "memory");
    assert_eq!(json["record_store"]["reachable"], true);
}

#[tokio::test]
async fn dashboard_unavailable_when_store_offline() {
    let app = TestApp::spawn().await;
    app.store.set_available(false);

    let resp = app.get("/api/dashboard").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
}
