use std::fmt;

use aula_core::model::{Course, CourseId, Lesson, LessonId, Module, ModuleId, VideoSource};
use chrono::{DateTime, Utc};
use storage::repository::Storage;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    course_id: Option<CourseId>,
    course_title: String,
    course_desc: Option<String>,
    modules: u32,
    lessons: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
    InvalidModules { raw: String },
    InvalidLessons { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => {
                write!(f, "invalid --course-id value (expected UUID): {raw}")
            }
            ArgsError::InvalidModules { raw } => write!(f, "invalid --modules value: {raw}"),
            ArgsError::InvalidLessons { raw } => write!(f, "invalid --lessons value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("AULA_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut course_id = std::env::var("AULA_COURSE_ID")
            .ok()
            .and_then(|value| value.parse::<CourseId>().ok());
        let mut course_title =
            std::env::var("AULA_COURSE_TITLE").unwrap_or_else(|_| "Onboarding".into());
        let mut course_desc = std::env::var("AULA_COURSE_DESC").ok();
        let mut modules = std::env::var("AULA_MODULES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut lessons = std::env::var("AULA_LESSONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(4);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--course-id" => {
                    let value = require_value(&mut args, "--course-id")?;
                    let parsed = value
                        .parse::<CourseId>()
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?;
                    course_id = Some(parsed);
                }
                "--course-title" => {
                    let value = require_value(&mut args, "--course-title")?;
                    course_title = value;
                }
                "--course-desc" => {
                    let value = require_value(&mut args, "--course-desc")?;
                    course_desc = Some(value);
                }
                "--modules" => {
                    let value = require_value(&mut args, "--modules")?;
                    modules = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidModules { raw: value.clone() })?;
                }
                "--lessons" => {
                    let value = require_value(&mut args, "--lessons")?;
                    lessons = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLessons { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            course_id,
            course_title,
            course_desc,
            modules,
            lessons,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --course-id <uuid>        Course id to upsert (default: random)");
    eprintln!("  --course-title <name>     Course title (default: Onboarding)");
    eprintln!("  --course-desc <text>      Optional course description");
    eprintln!("  --modules <n>             Number of modules to create (default: 3)");
    eprintln!("  --lessons <n>             Lessons per module (default: 4)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!(
        "  AULA_DB_URL, AULA_COURSE_ID, AULA_COURSE_TITLE, AULA_COURSE_DESC, AULA_MODULES, AULA_LESSONS"
    );
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let course_id = args
        .course_id
        .unwrap_or_else(|| CourseId::new(Uuid::new_v4()));

    let mut modules = Vec::with_capacity(args.modules as usize);
    for m in 0..args.modules {
        let mut lessons = Vec::with_capacity(args.lessons as usize);
        for l in 0..args.lessons {
            let video = VideoSource::parse(format!(
                "https://cdn.example.com/videos/{course_id}/{}-{}.mp4",
                m + 1,
                l + 1
            ))?;
            lessons.push(Lesson::new(
                LessonId::new(Uuid::new_v4()),
                format!("Aula {}.{}", m + 1, l + 1),
                None,
                300,
                i32::try_from(l)?,
                Some(video),
            )?);
        }
        modules.push(Module::new(
            ModuleId::new(Uuid::new_v4()),
            format!("Módulo {}", m + 1),
            i32::try_from(m)?,
            lessons,
        )?);
    }

    let course = Course::new(
        course_id,
        args.course_title.clone(),
        args.course_desc.clone(),
        now,
        modules,
    )?;
    storage.courses.upsert_course(&course).await?;

    println!(
        "Seeded course {} ({} modules, {} lessons) into {}",
        course_id,
        args.modules,
        course.lesson_count(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
