//! Shared error types for the services crate.

use thiserror::Error;

use classroom_core::model::StudentId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("student {0} is not enrolled in any class")]
    NotEnrolled(StudentId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error("student not found: {0}")]
    StudentNotFound(StudentId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ClassService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassError {
    #[error("no class uses code {0}")]
    UnknownCode(String),
    #[error("could not generate a unique class code after {0} attempts")]
    CodeExhausted(u32),
    #[error(transparent)]
    Model(#[from] classroom_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
