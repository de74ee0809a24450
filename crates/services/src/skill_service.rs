use std::sync::Arc;

use classroom_core::model::StudentId;
use classroom_core::stats::{SkillInsight, skill_insights};
use storage::repository::{AttemptRepository, StorageError};

/// Per-skill accuracy bands from a student's question attempts.
#[derive(Clone)]
pub struct SkillService {
    attempts: Arc<dyn AttemptRepository>,
}

impl SkillService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    /// Insights sorted by skill tag. Attempts without a tag are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if attempts cannot be fetched.
    pub async fn insights(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<SkillInsight>, StorageError> {
        let attempts = self.attempts.attempts_for_student(student_id).await?;
        Ok(skill_insights(&attempts))
    }
}
