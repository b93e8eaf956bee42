//! Grade and attendance arithmetic. Every function here is pure and total:
//! missing or malformed input degrades to zero or the "no grade" sentinel.

use std::collections::HashMap;
use std::fmt;

use classhub_db::models::{Assignment, AttendanceRecord, AttendanceStatus, Grade, RecordId};
use serde::Serialize;

/// Rendered in place of a percentage when there is no score.
pub const NO_GRADE: &str = "-";

/// `score / total_points * 100`. `None` when the score is absent or the
/// assignment has no positive point total.
pub fn grade_percentage(score: Option<f64>, total_points: f64) -> Option<f64> {
    let score = score?;
    if !score.is_finite() || !total_points.is_finite() || total_points <= 0.0 {
        return None;
    }
    Some(score / total_points * 100.0)
}

pub fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(value) => format!("{}%", value.round() as i64),
        None => NO_GRADE.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    /// Lower bounds are inclusive: 90 is an A, 89.99 a B.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            LetterGrade::A
        } else if percentage >= 80.0 {
            LetterGrade::B
        } else if percentage >= 70.0 {
            LetterGrade::C
        } else if percentage >= 60.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

fn round_percent(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// Earned points over possible points across the student's graded
/// assignments, rounded. Ungraded assignments count toward neither side.
pub fn student_average(student_id: RecordId, grades: &[Grade], assignments: &[Assignment]) -> u32 {
    let totals: HashMap<RecordId, f64> = assignments
        .iter()
        .filter_map(|a| Some((a.id?, a.total_points)))
        .collect();

    let (earned, possible) = grades
        .iter()
        .filter(|g| g.student_id == student_id)
        .filter_map(|g| {
            let score = g.score.filter(|s| s.is_finite())?;
            let total = *totals.get(&g.assignment_id)?;
            (total > 0.0).then_some((score, total))
        })
        .fold((0.0, 0.0), |(earned, possible), (score, total)| {
            (earned + score, possible + total)
        });

    if possible <= 0.0 {
        return 0;
    }
    round_percent(earned / possible * 100.0)
}

/// Per-status counts plus the attended percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub excused: usize,
    pub percentage: u32,
}

impl AttendanceStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut stats = AttendanceStats::default();
        for record in records {
            stats.total += 1;
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Excused => stats.excused += 1,
            }
        }
        if stats.total > 0 {
            stats.percentage =
                round_percent((stats.present + stats.late) as f64 / stats.total as f64 * 100.0);
        }
        stats
    }

    pub fn attended(&self) -> usize {
        self.present + self.late
    }
}

pub fn attendance_stats(student_id: RecordId, records: &[AttendanceRecord]) -> AttendanceStats {
    AttendanceStats::from_records(records.iter().filter(|r| r.student_id == student_id))
}

/// Present and late over all of the student's records, rounded; 0 with no
/// records.
pub fn attendance_rate(student_id: RecordId, records: &[AttendanceRecord]) -> u32 {
    attendance_stats(student_id, records).percentage
}
