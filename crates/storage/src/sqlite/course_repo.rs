use std::collections::HashMap;

use aula_core::model::{Course, CourseId, Lesson, Module, ModuleId};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{course_id_from_text, map_lesson_row, module_id_from_text, order_index_from_i64},
};
use crate::repository::{CourseRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteRepository {
    async fn load_modules(&self, course_id: CourseId) -> Result<Vec<Module>, StorageError> {
        let module_rows = sqlx::query(
            r"
                SELECT id, title, order_index
                FROM modules
                WHERE course_id = ?1
                ORDER BY order_index ASC, id ASC
            ",
        )
        .bind(course_id.value().to_string())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let lesson_rows = sqlx::query(
            r"
                SELECT l.id, l.module_id, l.title, l.description, l.duration_secs,
                       l.order_index, l.video_url
                FROM lessons l
                JOIN modules m ON m.id = l.module_id
                WHERE m.course_id = ?1
                ORDER BY l.order_index ASC, l.id ASC
            ",
        )
        .bind(course_id.value().to_string())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut lessons_by_module: HashMap<ModuleId, Vec<Lesson>> = HashMap::new();
        for row in lesson_rows {
            let module_id =
                module_id_from_text(row.try_get::<String, _>("module_id").map_err(ser)?.as_str())?;
            lessons_by_module
                .entry(module_id)
                .or_default()
                .push(map_lesson_row(&row)?);
        }

        let mut modules = Vec::with_capacity(module_rows.len());
        for row in module_rows {
            let id = module_id_from_text(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
            let title: String = row.try_get("title").map_err(ser)?;
            let order_index = order_index_from_i64(
                "order_index",
                row.try_get::<i64, _>("order_index").map_err(ser)?,
            )?;
            let lessons = lessons_by_module.remove(&id).unwrap_or_default();
            modules.push(Module::new(id, title, order_index, lessons).map_err(ser)?);
        }

        Ok(modules)
    }
}

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut tx = self.pool().begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO courses (id, title, description, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description
            ",
        )
        .bind(course.id().value().to_string())
        .bind(course.title())
        .bind(course.description())
        .bind(course.created_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // Replace the aggregate's children wholesale; lessons go with their
        // modules via the cascade.
        sqlx::query("DELETE FROM modules WHERE course_id = ?1")
            .bind(course.id().value().to_string())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for module in course.modules() {
            sqlx::query(
                r"
                    INSERT INTO modules (id, course_id, title, order_index)
                    VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(module.id().value().to_string())
            .bind(course.id().value().to_string())
            .bind(module.title())
            .bind(i64::from(module.order_index()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for lesson in module.lessons() {
                sqlx::query(
                    r"
                        INSERT INTO lessons (
                            id, module_id, title, description, duration_secs,
                            order_index, video_url
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ",
                )
                .bind(lesson.id().value().to_string())
                .bind(module.id().value().to_string())
                .bind(lesson.title())
                .bind(lesson.description())
                .bind(i64::from(lesson.duration_secs()))
                .bind(i64::from(lesson.order_index()))
                .bind(lesson.video().map(|v| v.as_str().to_owned()))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, title, description, created_at
                FROM courses
                WHERE id = ?1
            ",
        )
        .bind(id.value().to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let course_id =
            course_id_from_text(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
        let title: String = row.try_get("title").map_err(ser)?;
        let description: Option<String> = row.try_get("description").map_err(ser)?;
        let created_at = row.try_get("created_at").map_err(ser)?;

        let modules = self.load_modules(course_id).await?;

        Course::new(course_id, title, description, created_at, modules)
            .map(Some)
            .map_err(ser)
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id
                FROM courses
                ORDER BY created_at DESC, id ASC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let id = course_id_from_text(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
            if let Some(course) = self.get_course(id).await? {
                courses.push(course);
            }
        }

        Ok(courses)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id.value().to_string())
            .execute(self.pool())
            .await
            .map_err(conn)?;
        Ok(())
    }
}
