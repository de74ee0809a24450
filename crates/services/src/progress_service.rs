use std::sync::Arc;

use classroom_core::model::{ClassId, ContainerProgress, StatusFilter, StudentId};
use classroom_core::{compute_best_accuracy, compute_container_progress, filter_by_status};
use storage::repository::{CatalogRepository, ClassRepository, ResultRepository};

use crate::error::ProgressError;

/// Per-container progress for a student within a class.
#[derive(Clone)]
pub struct ProgressService {
    results: Arc<dyn ResultRepository>,
    catalog: Arc<dyn CatalogRepository>,
    classes: Arc<dyn ClassRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        results: Arc<dyn ResultRepository>,
        catalog: Arc<dyn CatalogRepository>,
        classes: Arc<dyn ClassRepository>,
    ) -> Self {
        Self {
            results,
            catalog,
            classes,
        }
    }

    /// The class a student is working in: their earliest enrollment.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotEnrolled` if the student has no classes.
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn active_class(&self, student_id: &StudentId) -> Result<ClassId, ProgressError> {
        self.classes
            .classes_for_student(student_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProgressError::NotEnrolled(student_id.clone()))
    }

    /// Progress for every container in the class catalog, in catalog order.
    ///
    /// Results and catalog are fetched concurrently; aggregation only starts
    /// once both have arrived.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if either fetch fails.
    pub async fn container_progress(
        &self,
        student_id: &StudentId,
        class_id: &ClassId,
    ) -> Result<Vec<ContainerProgress>, ProgressError> {
        let (results, catalog) = tokio::try_join!(
            self.results.results_for_student(student_id, None),
            self.catalog.catalog_for_class(class_id),
        )?;
        log::debug!(
            "aggregating {} results over {} catalog entries for {student_id}",
            results.len(),
            catalog.len()
        );

        let best = compute_best_accuracy(&results);
        Ok(compute_container_progress(&catalog, &best))
    }

    /// Like [`Self::container_progress`], keeping only containers that match `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if either fetch fails.
    pub async fn progress_filtered(
        &self,
        student_id: &StudentId,
        class_id: &ClassId,
        filter: StatusFilter,
    ) -> Result<Vec<ContainerProgress>, ProgressError> {
        let all = self.container_progress(student_id, class_id).await?;
        Ok(filter_by_status(all, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use classroom_core::model::{
        ContainerId, ContainerStatus, LessonCatalogEntry, LessonResult, LessonResultRecord,
    };
    use classroom_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    async fn seeded() -> (ProgressService, StudentId, ClassId) {
        let repo = InMemoryRepository::default();
        let student = StudentId::new("s1");
        let class_id = ClassId::new("c1");

        for entry in [
            LessonCatalogEntry::new("A", "C1", 1),
            LessonCatalogEntry::new("B", "C1", 2),
            LessonCatalogEntry::new("C", "C2", 3),
            LessonCatalogEntry::new("D", "C3", 4),
        ] {
            repo.upsert_lesson_link(&class_id, &entry).await.unwrap();
        }
        repo.set_container_locked(&class_id, &ContainerId::new("C3"), true)
            .await
            .unwrap();

        for result in [
            LessonResult::new("A", 19, 20),
            LessonResult::new("B", 1, 2),
            LessonResult::new("C", 10, 10),
            LessonResult::new("D", 10, 10),
        ] {
            repo.append_result(&LessonResultRecord::new(student.clone(), result, fixed_now()))
                .await
                .unwrap();
        }

        let repo = Arc::new(repo);
        let service = ProgressService::new(repo.clone(), repo.clone(), repo);
        (service, student, class_id)
    }

    #[tokio::test]
    async fn container_progress_follows_catalog_order() {
        let (service, student, class_id) = seeded().await;

        let progress = service.container_progress(&student, &class_id).await.unwrap();
        let summary: Vec<(&str, u8, ContainerStatus)> = progress
            .iter()
            .map(|p| (p.container_id.as_str(), p.percent_complete, p.status))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("C1", 50, ContainerStatus::InProgress),
                ("C2", 100, ContainerStatus::Completed),
                ("C3", 100, ContainerStatus::Locked),
            ]
        );
    }

    #[tokio::test]
    async fn filtered_progress_keeps_matching_status() {
        let (service, student, class_id) = seeded().await;

        let locked = service
            .progress_filtered(
                &student,
                &class_id,
                StatusFilter::Only(ContainerStatus::Locked),
            )
            .await
            .unwrap();
        assert_eq!(locked.len(), 1);
        assert_eq!(locked[0].container_id.as_str(), "C3");
    }

    #[tokio::test]
    async fn unknown_class_yields_empty_progress() {
        let (service, student, _) = seeded().await;
        let progress = service
            .container_progress(&student, &ClassId::new("missing"))
            .await
            .unwrap();
        assert!(progress.is_empty());
    }

    #[tokio::test]
    async fn active_class_requires_enrollment() {
        let (service, student, _) = seeded().await;
        let err = service.active_class(&student).await.unwrap_err();
        assert!(matches!(err, ProgressError::NotEnrolled(id) if id == student));
    }
}
