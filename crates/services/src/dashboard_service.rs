use std::sync::Arc;

use serde::Serialize;

use classroom_core::compute_best_accuracy;
use classroom_core::model::{ClassId, Level, Student, StudentId};
use classroom_core::stats::{
    DashboardStats, current_level, streak_days, streak_window_start, total_points,
};
use storage::repository::{
    CatalogRepository, ClassRepository, PointsRepository, ResultRepository, SessionRepository,
    Storage, StudentRepository,
};

use crate::Clock;
use crate::error::DashboardError;

/// Everything the student home screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    pub student: Student,
    pub class_id: Option<ClassId>,
    pub stats: DashboardStats,
    pub level: Option<Level>,
}

#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    students: Arc<dyn StudentRepository>,
    classes: Arc<dyn ClassRepository>,
    catalog: Arc<dyn CatalogRepository>,
    results: Arc<dyn ResultRepository>,
    points: Arc<dyn PointsRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage) -> Self {
        Self {
            clock,
            students: Arc::clone(&storage.students),
            classes: Arc::clone(&storage.classes),
            catalog: Arc::clone(&storage.catalog),
            results: Arc::clone(&storage.results),
            points: Arc::clone(&storage.points),
            sessions: Arc::clone(&storage.sessions),
        }
    }

    /// Load the dashboard for a student.
    ///
    /// The active class is the student's earliest enrollment; a student with no
    /// class still gets stats, with the lesson total taken from their results.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::StudentNotFound` if the student does not exist.
    /// Returns `DashboardError::Storage` if any fetch fails.
    pub async fn load(&self, student_id: &StudentId) -> Result<StudentDashboard, DashboardError> {
        let today = self.clock.today();
        let (student, classes, points, levels, results, sessions) = tokio::try_join!(
            self.students.get_student(student_id),
            self.classes.classes_for_student(student_id),
            self.points.points_for_student(student_id),
            self.points.list_levels(),
            self.results.results_for_student(student_id, None),
            self.sessions.sessions_since(student_id, streak_window_start(today)),
        )?;

        let student = student.ok_or_else(|| DashboardError::StudentNotFound(student_id.clone()))?;

        let class_id = classes.into_iter().next();
        let class_lesson_count = match &class_id {
            Some(id) => self.catalog.catalog_for_class(id).await?.len(),
            None => {
                log::warn!("student {student_id} has no class; using lessons from results");
                0
            }
        };

        let total = total_points(&points);
        let streak = streak_days(sessions.iter().map(|s| s.created_at), today);
        let best = compute_best_accuracy(&results);
        let stats = DashboardStats::compute(&best, &results, class_lesson_count, total, streak);
        let level = current_level(&levels, total).cloned();

        log::debug!(
            "dashboard for {student_id}: {} points, {}/{} lessons, streak {streak}",
            stats.total_points,
            stats.lessons_completed,
            stats.total_lessons
        );

        Ok(StudentDashboard {
            student,
            class_id,
            stats,
            level,
        })
    }
}
