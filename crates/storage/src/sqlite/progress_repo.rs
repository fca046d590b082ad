use aula_core::model::{LessonId, ProgressRecord, UserId};

use super::{SqliteRepository, mapping::map_progress_row};
use crate::repository::{ProgressRepository, ProgressUpdate, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        update: ProgressUpdate,
    ) -> Result<(), StorageError> {
        // COALESCE keeps the stored value for fields the update leaves unset,
        // so a throttled percent write never clears a completion flag.
        sqlx::query(
            r"
                INSERT INTO user_progress (user_id, lesson_id, progress, completed, last_watched)
                VALUES (?1, ?2, COALESCE(?3, 0), COALESCE(?4, 0), ?5)
                ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                    progress = COALESCE(?3, user_progress.progress),
                    completed = COALESCE(?4, user_progress.completed),
                    last_watched = ?5
            ",
        )
        .bind(user_id.value().to_string())
        .bind(lesson_id.value().to_string())
        .bind(update.percent)
        .bind(update.completed)
        .bind(update.last_watched)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, lesson_id, progress, completed, last_watched
                FROM user_progress
                WHERE user_id = ?1 AND lesson_id = ?2
            ",
        )
        .bind(user_id.value().to_string())
        .bind(lesson_id.value().to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn list_progress(
        &self,
        user_id: UserId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
                SELECT user_id, lesson_id, progress, completed, last_watched
                FROM user_progress
                WHERE user_id = ?1 AND lesson_id IN (
            ",
        );

        for i in 0..lesson_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 2).to_string());
        }
        sql.push_str(")\n ORDER BY lesson_id ASC");

        let mut query = sqlx::query(&sql).bind(user_id.value().to_string());
        for lesson_id in lesson_ids {
            query = query.bind(lesson_id.value().to_string());
        }

        let rows = query.fetch_all(self.pool()).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }

        Ok(out)
    }
}
