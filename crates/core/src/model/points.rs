use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::StudentId;

/// One row of the points ledger. Missing `points` counts as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub student_id: StudentId,
    #[serde(default)]
    pub points: Option<i64>,
    pub source_type: String,
    pub created_at: DateTime<Utc>,
}

impl PointsEntry {
    #[must_use]
    pub fn new(
        student_id: StudentId,
        points: i64,
        source_type: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            student_id,
            points: Some(points),
            source_type: source_type.into(),
            created_at,
        }
    }
}

/// A level on the XP ladder, reached once total points meet `required_points`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub level: u32,
    pub required_points: i64,
    pub title: String,
}

impl Level {
    #[must_use]
    pub fn new(level: u32, required_points: i64, title: impl Into<String>) -> Self {
        Self {
            level,
            required_points,
            title: title.into(),
        }
    }
}
