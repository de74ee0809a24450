use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS students (
            student_id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            grade INTEGER CHECK (grade IS NULL OR grade >= 0),
            class_section TEXT
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS classes (
            class_id TEXT PRIMARY KEY,
            class_name TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            teacher_code TEXT NOT NULL UNIQUE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS student_classes (
            id INTEGER PRIMARY KEY,
            student_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            UNIQUE (student_id, class_id),
            FOREIGN KEY (class_id) REFERENCES classes(class_id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS class_lessons (
            class_id TEXT NOT NULL,
            lesson_id TEXT NOT NULL,
            container_id TEXT NOT NULL,
            display_order INTEGER,
            PRIMARY KEY (class_id, lesson_id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS class_containers (
            class_id TEXT NOT NULL,
            container_id TEXT NOT NULL,
            locked INTEGER NOT NULL CHECK (locked IN (0, 1)),
            PRIMARY KEY (class_id, container_id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS lesson_results (
            id INTEGER PRIMARY KEY,
            student_id TEXT NOT NULL,
            lesson_id TEXT NOT NULL,
            correct_count INTEGER CHECK (correct_count IS NULL OR correct_count >= 0),
            total_count INTEGER CHECK (total_count IS NULL OR total_count >= 0),
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS game_points_ledger (
            id INTEGER PRIMARY KEY,
            student_id TEXT NOT NULL,
            points INTEGER,
            source_type TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS levels (
            level INTEGER PRIMARY KEY CHECK (level >= 0),
            required_points INTEGER NOT NULL,
            title TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY,
            student_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS question_attempts (
            id INTEGER PRIMARY KEY,
            student_id TEXT NOT NULL,
            question_id TEXT NOT NULL,
            lesson_id TEXT NOT NULL,
            skill_tag TEXT,
            is_correct INTEGER NOT NULL CHECK (is_correct IN (0, 1)),
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_lesson_results_student_lesson
            ON lesson_results (student_id, lesson_id, created_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_class_lessons_class_order
            ON class_lessons (class_id, display_order, lesson_id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_points_student
            ON game_points_ledger (student_id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_sessions_student_created
            ON sessions (student_id, created_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_attempts_student
            ON question_attempts (student_id, created_at);
    ",
];

/// Runs versioned migrations for the current schema.
///
/// Version 1 creates the roster, catalog, results, points, sessions and
/// attempts tables with their indexes.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!("applied schema version 1");
    }

    Ok(())
}
