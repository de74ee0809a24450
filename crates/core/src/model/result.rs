use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, StudentId};

//
// ─── LESSON RESULT ─────────────────────────────────────────────────────────────
//

/// One finished practice run of a lesson.
///
/// Counts are optional because rows coming from the external store may omit
/// them. A row without a positive `total_count` carries no accuracy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonResult {
    pub lesson_id: LessonId,
    #[serde(default)]
    pub correct_count: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u32>,
}

impl LessonResult {
    #[must_use]
    pub fn new(lesson_id: impl Into<LessonId>, correct_count: u32, total_count: u32) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            correct_count: Some(correct_count),
            total_count: Some(total_count),
        }
    }

    /// Accuracy of this row in `[0, 1]`, or `None` when there is no denominator.
    ///
    /// A missing correct count reads as zero. A correct count above the total
    /// is clamped to 1.0.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total_count.filter(|t| *t > 0)?;
        let correct = self.correct_count.unwrap_or(0);
        Some((f64::from(correct) / f64::from(total)).min(1.0))
    }
}

//
// ─── PERSISTED ROW ─────────────────────────────────────────────────────────────
//

/// A lesson result as stored, owned by a student and timestamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonResultRecord {
    pub student_id: StudentId,
    pub result: LessonResult,
    pub created_at: DateTime<Utc>,
}

impl LessonResultRecord {
    #[must_use]
    pub fn new(student_id: StudentId, result: LessonResult, created_at: DateTime<Utc>) -> Self {
        Self {
            student_id,
            result,
            created_at,
        }
    }
}
