use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, QuestionId, StudentId};

/// A practice session. Only the start time matters for streaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub student_id: StudentId,
    pub created_at: DateTime<Utc>,
}

/// A single answered question, joined with the question's skill tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAttempt {
    pub student_id: StudentId,
    pub question_id: QuestionId,
    pub lesson_id: LessonId,
    #[serde(default)]
    pub skill_tag: Option<String>,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}
