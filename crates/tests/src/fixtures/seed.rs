use chrono::NaiveDate;
use serde_json::Value;

use super::test_app::TestApp;

pub fn id_of(json: &Value) -> i64 {
    json["id"].as_i64().expect("response has no numeric id")
}

impl TestApp {
    /// POST a JSON body and return the parsed response, asserting success.
    pub async fn post_ok(&self, path: &str, body: Value) -> Value {
        let resp = self
            .post(path)
            .json(&body)
            .send()
            .await
            .expect("POST request failed");
        assert!(
            resp.status().is_success(),
            "POST {} failed: {}",
            path,
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.expect("Failed to parse response")
    }

    /// PUT a JSON body and return the parsed response, asserting success.
    pub async fn put_ok(&self, path: &str, body: Value) -> Value {
        let resp = self
            .put(path)
            .json(&body)
            .send()
            .await
            .expect("PUT request failed");
        assert!(
            resp.status().is_success(),
            "PUT {} failed: {}",
            path,
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.expect("Failed to parse response")
    }

    pub async fn get_json(&self, path: &str) -> Value {
        let resp = self.get(path).send().await.expect("GET request failed");
        assert!(
            resp.status().is_success(),
            "GET {} failed: {}",
            path,
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.expect("Failed to parse response")
    }

    pub async fn create_student(&self, first_name: &str, last_name: &str) -> Value {
        self.post_ok(
            "/api/student",
            serde_json::json!({
                "first_name": first_name,
                "last_name": last_name,
                "email": format!("{}.{}@school.test", first_name, last_name).to_lowercase(),
                "date_of_birth": "2010-04-12",
                "enrollment_date": "2024-09-01",
            }),
        )
        .await
    }

    pub async fn create_class(&self, name: &str, subject: &str) -> Value {
        self.post_ok(
            "/api/class",
            serde_json::json!({
                "name": name,
                "subject": subject,
                "period": "1st",
                "room": "101",
            }),
        )
        .await
    }

    pub async fn create_assignment(
        &self,
        class_id: i64,
        name: &str,
        due_date: Option<NaiveDate>,
        total_points: f64,
    ) -> Value {
        self.post_ok(
            "/api/assignment",
            serde_json::json!({
                "name": name,
                "due_date": due_date,
                "total_points": total_points,
                "category": "Homework",
                "class_id": class_id,
            }),
        )
        .await
    }

    pub async fn save_grade(&self, student_id: i64, assignment_id: i64, score: Option<f64>) -> Value {
        self.put_ok(
            "/api/grade",
            serde_json::json!({
                "student_id": student_id,
                "assignment_id": assignment_id,
                "score": score,
            }),
        )
        .await
    }

    pub async fn mark_attendance(
        &self,
        student_id: i64,
        class_id: i64,
        date: NaiveDate,
        status: &str,
    ) -> Value {
        self.put_ok(
            "/api/attendance",
            serde_json::json!({
                "student_id": student_id,
                "class_id": class_id,
                "date": date,
                "status": status,
            }),
        )
        .await
    }
}
