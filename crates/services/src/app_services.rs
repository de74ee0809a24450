use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::class_service::ClassService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::skill_service::SkillService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    progress: Arc<ProgressService>,
    dashboard: Arc<DashboardService>,
    skills: Arc<SkillService>,
    classes: Arc<ClassService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.results),
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.classes),
        ));
        let dashboard = Arc::new(DashboardService::new(clock, &storage));
        let skills = Arc::new(SkillService::new(Arc::clone(&storage.attempts)));
        let classes = Arc::new(ClassService::new(Arc::clone(&storage.classes)));

        Self {
            storage,
            progress,
            dashboard,
            skills,
            classes,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn skills(&self) -> Arc<SkillService> {
        Arc::clone(&self.skills)
    }

    #[must_use]
    pub fn classes(&self) -> Arc<ClassService> {
        Arc::clone(&self.classes)
    }
}
