use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;

use classroom_core::model::{Class, ClassId, StudentId, TeacherId};
use storage::repository::{ClassRepository, StorageError};

use crate::error::ClassError;

/// Characters allowed in class codes. No `0/O` or `1/I` look-alikes.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LEN: usize = 6;
const MAX_CODE_ATTEMPTS: u32 = 8;

/// Draw a fresh class code from [`CODE_ALPHABET`].
#[must_use]
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .filter_map(|_| CODE_ALPHABET.choose(&mut *rng).copied().map(char::from))
        .collect()
}

/// Codes are typed by hand, so matching ignores case and surrounding spaces.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Class creation and enrollment by teacher code.
#[derive(Clone)]
pub struct ClassService {
    classes: Arc<dyn ClassRepository>,
}

impl ClassService {
    #[must_use]
    pub fn new(classes: Arc<dyn ClassRepository>) -> Self {
        Self { classes }
    }

    /// Create a class with a random, unused teacher code.
    ///
    /// # Errors
    ///
    /// Returns `ClassError::Model` if the name is blank.
    /// Returns `ClassError::CodeExhausted` if every generated code collided.
    /// Returns `ClassError::Storage` if persistence fails.
    pub async fn create_class(
        &self,
        teacher_id: &TeacherId,
        name: &str,
    ) -> Result<Class, ClassError> {
        self.create_class_with(teacher_id, name, || generate_code(&mut rand::rng()))
            .await
    }

    /// Like [`Self::create_class`], drawing codes from `next_code`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_class`].
    pub async fn create_class_with<F>(
        &self,
        teacher_id: &TeacherId,
        name: &str,
        mut next_code: F,
    ) -> Result<Class, ClassError>
    where
        F: FnMut() -> String + Send,
    {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = next_code();
            let class_id = ClassId::new(format!("class-{}", code.to_ascii_lowercase()));
            let class = Class::new(class_id, name, teacher_id.clone(), code)
                .map_err(classroom_core::Error::from)?;

            match self.classes.insert_class(&class).await {
                Ok(()) => {
                    log::info!(
                        "created class {} for teacher {teacher_id} with code {}",
                        class.id,
                        class.teacher_code
                    );
                    return Ok(class);
                }
                Err(StorageError::Conflict) => {
                    log::warn!(
                        "class code {} already taken (attempt {attempt})",
                        class.teacher_code
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ClassError::CodeExhausted(MAX_CODE_ATTEMPTS))
    }

    /// Enroll a student in the class that owns `code`.
    ///
    /// Joining a class twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ClassError::UnknownCode` if no class uses the code.
    /// Returns `ClassError::Storage` if lookup or enrollment fails.
    pub async fn join_class(
        &self,
        student_id: &StudentId,
        code: &str,
    ) -> Result<Class, ClassError> {
        let code = normalize_code(code);
        let class = self
            .classes
            .class_by_code(&code)
            .await?
            .ok_or(ClassError::UnknownCode(code))?;

        self.classes.enroll(student_id, &class.id).await?;
        log::info!("student {student_id} joined class {}", class.id);
        Ok(class)
    }
}
