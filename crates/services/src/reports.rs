//! Summaries assembled from already-loaded records. Callers fetch the rows;
//! nothing here touches the record store.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use classhub_db::models::{
    Assignment, AssignmentCategory, AttendanceRecord, AttendanceStatus, Class, Enrollment, Grade,
    RecordId, Student,
};
use serde::Serialize;

use crate::metrics::{self, AttendanceStats, LetterGrade};

const TODAY_ATTENDANCE_LIMIT: usize = 5;
const UNKNOWN_STUDENT: &str = "Unknown";
const UNKNOWN_CLASS: &str = "Unknown Class";

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceEntry {
    pub id: Option<RecordId>,
    pub student_name: String,
    pub class_name: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub active_classes: usize,
    pub average_grade: u32,
    pub attendance_rate: u32,
    pub today_attendance: Vec<AttendanceEntry>,
}

pub fn dashboard_stats(
    students: &[Student],
    classes: &[Class],
    grades: &[Grade],
    assignments: &[Assignment],
    attendance: &[AttendanceRecord],
    today: NaiveDate,
) -> DashboardStats {
    let totals: HashMap<RecordId, f64> = assignments
        .iter()
        .filter_map(|a| Some((a.id?, a.total_points)))
        .collect();
    let percentages: Vec<f64> = grades
        .iter()
        .filter_map(|g| metrics::grade_percentage(g.score, *totals.get(&g.assignment_id)?))
        .collect();
    let average_grade = if percentages.is_empty() {
        0
    } else {
        (percentages.iter().sum::<f64>() / percentages.len() as f64).round().max(0.0) as u32
    };

    let todays: Vec<&AttendanceRecord> = attendance.iter().filter(|r| r.date == today).collect();
    let attendance_rate = AttendanceStats::from_records(todays.iter().copied()).percentage;

    let student_names: HashMap<RecordId, String> = students
        .iter()
        .filter_map(|s| Some((s.id?, s.full_name())))
        .collect();
    let class_names: HashMap<RecordId, &str> = classes
        .iter()
        .filter_map(|c| Some((c.id?, c.name.as_str())))
        .collect();

    let today_attendance = todays
        .iter()
        .take(TODAY_ATTENDANCE_LIMIT)
        .map(|record| AttendanceEntry {
            id: record.id,
            student_name: student_names
                .get(&record.student_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_STUDENT.to_string()),
            class_name: class_names
                .get(&record.class_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| UNKNOWN_CLASS.to_string()),
            status: record.status,
        })
        .collect();

    DashboardStats {
        total_students: students.iter().filter(|s| s.is_active()).count(),
        active_classes: classes.len(),
        average_grade,
        attendance_rate,
        today_attendance,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassOverview {
    pub total_classes: usize,
    pub subjects: usize,
    pub total_enrollment: usize,
    pub average_class_size: u32,
}

pub fn class_overview(classes: &[Class], enrollments: &[Enrollment]) -> ClassOverview {
    let class_ids: BTreeSet<RecordId> = classes.iter().filter_map(|c| c.id).collect();
    let subjects: BTreeSet<&str> = classes
        .iter()
        .map(|c| c.subject.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    let total_enrollment = enrollments
        .iter()
        .filter(|e| class_ids.contains(&e.class_id))
        .map(|e| (e.class_id, e.student_id))
        .collect::<BTreeSet<_>>()
        .len();

    ClassOverview {
        total_classes: classes.len(),
        subjects: subjects.len(),
        total_enrollment,
        average_class_size: (total_enrollment as f64 / classes.len().max(1) as f64).round() as u32,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub student_id: RecordId,
    pub average: u32,
    pub letter_grade: LetterGrade,
    pub attendance: AttendanceStats,
}

pub fn student_summary(
    student_id: RecordId,
    grades: &[Grade],
    assignments: &[Assignment],
    attendance: &[AttendanceRecord],
) -> StudentSummary {
    let average = metrics::student_average(student_id, grades, assignments);
    StudentSummary {
        student_id,
        average,
        letter_grade: LetterGrade::from_percentage(average as f64),
        attendance: metrics::attendance_stats(student_id, attendance),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradebookColumn {
    pub assignment_id: RecordId,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub total_points: f64,
    pub category: AssignmentCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradebookCell {
    pub assignment_id: RecordId,
    pub grade_id: Option<RecordId>,
    pub score: Option<f64>,
    pub percentage: Option<f64>,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradebookRow {
    pub student_id: RecordId,
    pub student_name: String,
    pub cells: Vec<GradebookCell>,
    pub average: u32,
    pub letter_grade: LetterGrade,
    pub attendance: AttendanceStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct Gradebook {
    pub class_id: RecordId,
    pub class_name: String,
    pub columns: Vec<GradebookColumn>,
    pub rows: Vec<GradebookRow>,
}

/// One row per student with a cell per class assignment. Averages and
/// attendance only consider this class's assignments and records.
pub fn class_gradebook(
    class: &Class,
    students: &[Student],
    assignments: &[Assignment],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> Gradebook {
    let class_id = class.id.unwrap_or_default();
    let class_assignments: Vec<Assignment> = assignments
        .iter()
        .filter(|a| a.id.is_some() && a.class_id == Some(class_id))
        .cloned()
        .collect();
    let class_attendance: Vec<AttendanceRecord> = attendance
        .iter()
        .filter(|r| r.class_id == class_id)
        .cloned()
        .collect();

    let columns = class_assignments
        .iter()
        .filter_map(|a| {
            Some(GradebookColumn {
                assignment_id: a.id?,
                name: a.name.clone(),
                due_date: a.due_date,
                total_points: a.total_points,
                category: a.category,
            })
        })
        .collect();

    let mut sorted: Vec<&Student> = students.iter().filter(|s| s.id.is_some()).collect();
    sorted.sort_by(|a, b| {
        (a.last_name.as_str(), a.first_name.as_str()).cmp(&(b.last_name.as_str(), b.first_name.as_str()))
    });

    let rows = sorted
        .into_iter()
        .filter_map(|student| {
            let student_id = student.id?;
            let cells = class_assignments
                .iter()
                .filter_map(|assignment| {
                    let assignment_id = assignment.id?;
                    let grade = grades
                        .iter()
                        .find(|g| g.student_id == student_id && g.assignment_id == assignment_id);
                    let score = grade.and_then(|g| g.score);
                    let percentage = metrics::grade_percentage(score, assignment.total_points);
                    Some(GradebookCell {
                        assignment_id,
                        grade_id: grade.and_then(|g| g.id),
                        score,
                        percentage,
                        display: metrics::format_percentage(percentage),
                    })
                })
                .collect();

            let average = metrics::student_average(student_id, grades, &class_assignments);
            Some(GradebookRow {
                student_id,
                student_name: student.full_name(),
                cells,
                average,
                letter_grade: LetterGrade::from_percentage(average as f64),
                attendance: metrics::attendance_stats(student_id, &class_attendance),
            })
        })
        .collect();

    Gradebook {
        class_id,
        class_name: class.name.clone(),
        columns,
        rows,
    }
}
