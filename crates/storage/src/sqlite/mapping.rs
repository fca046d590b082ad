use aula_core::model::{
    CourseId, Lesson, LessonId, ModuleId, ProgressRecord, UserId, VideoSource,
};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn course_id_from_text(raw: &str) -> Result<CourseId, StorageError> {
    raw.parse::<CourseId>().map_err(ser)
}

pub(crate) fn module_id_from_text(raw: &str) -> Result<ModuleId, StorageError> {
    raw.parse::<ModuleId>().map_err(ser)
}

pub(crate) fn lesson_id_from_text(raw: &str) -> Result<LessonId, StorageError> {
    raw.parse::<LessonId>().map_err(ser)
}

pub(crate) fn user_id_from_text(raw: &str) -> Result<UserId, StorageError> {
    raw.parse::<UserId>().map_err(ser)
}

pub(crate) fn order_index_from_i64(field: &'static str, v: i64) -> Result<i32, StorageError> {
    i32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_lesson_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lesson, StorageError> {
    let id = lesson_id_from_text(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let title: String = row.try_get("title").map_err(ser)?;
    let description: Option<String> = row.try_get("description").map_err(ser)?;

    let duration_i64: i64 = row.try_get("duration_secs").map_err(ser)?;
    let duration_secs = u32::try_from(duration_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid duration_secs: {duration_i64}")))?;

    let order_index =
        order_index_from_i64("order_index", row.try_get::<i64, _>("order_index").map_err(ser)?)?;

    let video = row
        .try_get::<Option<String>, _>("video_url")
        .map_err(ser)?
        .map(VideoSource::parse)
        .transpose()
        .map_err(ser)?;

    Lesson::new(id, title, description, duration_secs, order_index, video).map_err(ser)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    let user_id = user_id_from_text(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?;
    let lesson_id =
        lesson_id_from_text(row.try_get::<String, _>("lesson_id").map_err(ser)?.as_str())?;
    let percent: f64 = row.try_get("progress").map_err(ser)?;
    let completed: bool = row.try_get("completed").map_err(ser)?;
    let last_watched = row.try_get("last_watched").map_err(ser)?;

    ProgressRecord::from_persisted(user_id, lesson_id, percent, completed, last_watched)
        .map_err(ser)
}
