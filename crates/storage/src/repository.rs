use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_core::model::{
    Class, ClassId, ContainerId, LessonCatalogEntry, LessonId, LessonResult, LessonResultRecord,
    Level, PointsEntry, QuestionAttempt, Student, StudentId, StudySession,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Lesson results, one row per finished practice run.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a result row and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn append_result(&self, record: &LessonResultRecord) -> Result<i64, StorageError>;

    /// All results for a student, optionally restricted to a set of lessons.
    ///
    /// `Some(&[])` matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn results_for_student(
        &self,
        student_id: &StudentId,
        lessons: Option<&[LessonId]>,
    ) -> Result<Vec<LessonResult>, StorageError>;
}

/// Which lessons a class sees, and in which chapter or unit.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Link a lesson to a class, replacing any previous link for the same lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the link cannot be stored.
    async fn upsert_lesson_link(
        &self,
        class_id: &ClassId,
        entry: &LessonCatalogEntry,
    ) -> Result<(), StorageError>;

    /// Mark a container locked or unlocked for a class.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn set_container_locked(
        &self,
        class_id: &ClassId,
        container_id: &ContainerId,
        locked: bool,
    ) -> Result<(), StorageError>;

    /// Catalog for a class ordered by display order (unordered rows last), then lesson id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn catalog_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<LessonCatalogEntry>, StorageError>;
}

/// Points ledger and the level ladder.
#[async_trait]
pub trait PointsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_points(&self, entry: &PointsEntry) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn points_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<PointsEntry>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the level cannot be stored.
    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError>;

    /// Levels ordered by required points, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_levels(&self) -> Result<Vec<Level>, StorageError>;
}

/// Practice sessions, used for streaks.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn record_session(&self, session: &StudySession) -> Result<i64, StorageError>;

    /// Sessions started at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn sessions_since(
        &self,
        student_id: &StudentId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StudySession>, StorageError>;
}

/// Per-question attempts, carrying the question's skill tag.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &QuestionAttempt) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn attempts_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<QuestionAttempt>, StorageError>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the student cannot be stored.
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StorageError>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// Insert a new class.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id or teacher code is taken.
    async fn insert_class(&self, class: &Class) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_class(&self, id: &ClassId) -> Result<Option<Class>, StorageError>;

    /// Look up a class by its exact teacher code.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn class_by_code(&self, code: &str) -> Result<Option<Class>, StorageError>;

    /// Enroll a student. Enrolling twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the class does not exist.
    async fn enroll(&self, student_id: &StudentId, class_id: &ClassId) -> Result<(), StorageError>;

    /// Classes a student belongs to, in enrollment order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn classes_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<ClassId>, StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    results: Arc<Mutex<Vec<LessonResultRecord>>>,
    catalog: Arc<Mutex<HashMap<ClassId, Vec<LessonCatalogEntry>>>>,
    locks: Arc<Mutex<HashMap<(ClassId, ContainerId), bool>>>,
    points: Arc<Mutex<Vec<PointsEntry>>>,
    levels: Arc<Mutex<HashMap<u32, Level>>>,
    sessions: Arc<Mutex<Vec<StudySession>>>,
    attempts: Arc<Mutex<Vec<QuestionAttempt>>>,
    students: Arc<Mutex<HashMap<StudentId, Student>>>,
    classes: Arc<Mutex<Vec<Class>>>,
    enrollments: Arc<Mutex<Vec<(StudentId, ClassId)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn row_id(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, record: &LessonResultRecord) -> Result<i64, StorageError> {
        let mut guard = lock(&self.results)?;
        guard.push(record.clone());
        Ok(row_id(guard.len()))
    }

    async fn results_for_student(
        &self,
        student_id: &StudentId,
        lessons: Option<&[LessonId]>,
    ) -> Result<Vec<LessonResult>, StorageError> {
        let wanted: Option<HashSet<&LessonId>> = lessons.map(|ids| ids.iter().collect());
        let guard = lock(&self.results)?;
        let mut rows: Vec<&LessonResultRecord> = guard
            .iter()
            .filter(|r| &r.student_id == student_id)
            .filter(|r| {
                wanted
                    .as_ref()
                    .is_none_or(|set| set.contains(&r.result.lesson_id))
            })
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows.into_iter().map(|r| r.result.clone()).collect())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_lesson_link(
        &self,
        class_id: &ClassId,
        entry: &LessonCatalogEntry,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.catalog)?;
        let entries = guard.entry(class_id.clone()).or_default();
        let mut stored = entry.clone();
        // The lock flag lives on the container, not on the link.
        stored.container_locked = false;
        match entries.iter_mut().find(|e| e.lesson_id == entry.lesson_id) {
            Some(existing) => *existing = stored,
            None => entries.push(stored),
        }
        Ok(())
    }

    async fn set_container_locked(
        &self,
        class_id: &ClassId,
        container_id: &ContainerId,
        locked: bool,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.locks)?;
        guard.insert((class_id.clone(), container_id.clone()), locked);
        Ok(())
    }

    async fn catalog_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<LessonCatalogEntry>, StorageError> {
        let mut entries = lock(&self.catalog)?
            .get(class_id)
            .cloned()
            .unwrap_or_default();
        let locks = lock(&self.locks)?;
        for entry in &mut entries {
            entry.container_locked = locks
                .get(&(class_id.clone(), entry.container_id.clone()))
                .copied()
                .unwrap_or(false);
        }
        entries.sort_by(|a, b| {
            (a.display_order.is_none(), a.display_order, &a.lesson_id).cmp(&(
                b.display_order.is_none(),
                b.display_order,
                &b.lesson_id,
            ))
        });
        Ok(entries)
    }
}

#[async_trait]
impl PointsRepository for InMemoryRepository {
    async fn append_points(&self, entry: &PointsEntry) -> Result<i64, StorageError> {
        let mut guard = lock(&self.points)?;
        guard.push(entry.clone());
        Ok(row_id(guard.len()))
    }

    async fn points_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<PointsEntry>, StorageError> {
        let guard = lock(&self.points)?;
        Ok(guard
            .iter()
            .filter(|p| &p.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError> {
        let mut guard = lock(&self.levels)?;
        guard.insert(level.level, level.clone());
        Ok(())
    }

    async fn list_levels(&self) -> Result<Vec<Level>, StorageError> {
        let guard = lock(&self.levels)?;
        let mut levels: Vec<Level> = guard.values().cloned().collect();
        levels.sort_by_key(|l| (l.required_points, l.level));
        Ok(levels)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn record_session(&self, session: &StudySession) -> Result<i64, StorageError> {
        let mut guard = lock(&self.sessions)?;
        guard.push(session.clone());
        Ok(row_id(guard.len()))
    }

    async fn sessions_since(
        &self,
        student_id: &StudentId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StudySession>, StorageError> {
        let guard = lock(&self.sessions)?;
        let mut rows: Vec<StudySession> = guard
            .iter()
            .filter(|s| &s.student_id == student_id && s.created_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &QuestionAttempt) -> Result<i64, StorageError> {
        let mut guard = lock(&self.attempts)?;
        guard.push(attempt.clone());
        Ok(row_id(guard.len()))
    }

    async fn attempts_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<QuestionAttempt>, StorageError> {
        let guard = lock(&self.attempts)?;
        Ok(guard
            .iter()
            .filter(|a| &a.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        let mut guard = lock(&self.students)?;
        guard.insert(student.id().clone(), student.clone());
        Ok(())
    }

    async fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StorageError> {
        let guard = lock(&self.students)?;
        Ok(guard.get(id).cloned())
    }
}

#[async_trait]
impl ClassRepository for InMemoryRepository {
    async fn insert_class(&self, class: &Class) -> Result<(), StorageError> {
        let mut guard = lock(&self.classes)?;
        if guard
            .iter()
            .any(|c| c.id == class.id || c.teacher_code == class.teacher_code)
        {
            return Err(StorageError::Conflict);
        }
        guard.push(class.clone());
        Ok(())
    }

    async fn get_class(&self, id: &ClassId) -> Result<Option<Class>, StorageError> {
        let guard = lock(&self.classes)?;
        Ok(guard.iter().find(|c| &c.id == id).cloned())
    }

    async fn class_by_code(&self, code: &str) -> Result<Option<Class>, StorageError> {
        let guard = lock(&self.classes)?;
        Ok(guard.iter().find(|c| c.teacher_code == code).cloned())
    }

    async fn enroll(&self, student_id: &StudentId, class_id: &ClassId) -> Result<(), StorageError> {
        if !lock(&self.classes)?.iter().any(|c| &c.id == class_id) {
            return Err(StorageError::NotFound);
        }
        let mut guard = lock(&self.enrollments)?;
        if !guard
            .iter()
            .any(|(s, c)| s == student_id && c == class_id)
        {
            guard.push((student_id.clone(), class_id.clone()));
        }
        Ok(())
    }

    async fn classes_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<ClassId>, StorageError> {
        let guard = lock(&self.enrollments)?;
        Ok(guard
            .iter()
            .filter(|(s, _)| s == student_id)
            .map(|(_, c)| c.clone())
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn ResultRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub points: Arc<dyn PointsRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub classes: Arc<dyn ClassRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one repository value across every handle.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: ResultRepository
            + CatalogRepository
            + PointsRepository
            + SessionRepository
            + AttemptRepository
            + StudentRepository
            + ClassRepository
            + Clone
            + 'static,
    {
        Self {
            results: Arc::new(repo.clone()),
            catalog: Arc::new(repo.clone()),
            points: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            students: Arc::new(repo.clone()),
            classes: Arc::new(repo),
        }
    }
}
