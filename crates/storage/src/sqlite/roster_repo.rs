use classroom_core::model::{Class, ClassId, Student, StudentId};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{conn, map_class_row, map_student_row, ser, write_err},
};
use crate::repository::{ClassRepository, StorageError, StudentRepository};

#[async_trait::async_trait]
impl StudentRepository for SqliteRepository {
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO students (student_id, full_name, grade, class_section)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(student_id) DO UPDATE SET
                    full_name = excluded.full_name,
                    grade = excluded.grade,
                    class_section = excluded.class_section
            ",
        )
        .bind(student.id().as_str())
        .bind(student.full_name())
        .bind(student.grade().map(i64::from))
        .bind(student.class_section())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT student_id, full_name, grade, class_section
                FROM students
                WHERE student_id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_student_row).transpose()
    }
}

#[async_trait::async_trait]
impl ClassRepository for SqliteRepository {
    async fn insert_class(&self, class: &Class) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO classes (class_id, class_name, teacher_id, teacher_code)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(class.id.as_str())
        .bind(class.name.as_str())
        .bind(class.teacher_id.as_str())
        .bind(class.teacher_code.as_str())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn get_class(&self, id: &ClassId) -> Result<Option<Class>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT class_id, class_name, teacher_id, teacher_code
                FROM classes
                WHERE class_id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_class_row).transpose()
    }

    async fn class_by_code(&self, code: &str) -> Result<Option<Class>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT class_id, class_name, teacher_id, teacher_code
                FROM classes
                WHERE teacher_code = ?1
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_class_row).transpose()
    }

    async fn enroll(&self, student_id: &StudentId, class_id: &ClassId) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO student_classes (student_id, class_id)
                VALUES (?1, ?2)
                ON CONFLICT(student_id, class_id) DO NOTHING
            ",
        )
        .bind(student_id.as_str())
        .bind(class_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn classes_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<ClassId>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT class_id
                FROM student_classes
                WHERE student_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(student_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(ClassId::new(row.try_get::<String, _>("class_id").map_err(ser)?));
        }
        Ok(out)
    }
}
