mod activity;
mod catalog;
mod ids;
mod points;
mod result;
mod student;

pub use ids::{ClassId, ContainerId, LessonId, ParseIdError, QuestionId, StudentId, TeacherId};

pub use activity::{QuestionAttempt, StudySession};
pub use catalog::{
    CatalogError, ContainerProgress, ContainerStatus, LessonCatalogEntry, StatusFilter,
};
pub use points::{Level, PointsEntry};
pub use result::{LessonResult, LessonResultRecord};
pub use student::{Class, Student, StudentError};
