use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};

use advisor_core::{Course, CourseKind, Program};

/// Programs and their parsed courses in SQLite. Every call opens its own
/// connection, so the repository is cheap to clone across threads.
#[derive(Clone, Debug)]
pub struct Repository {
    path: PathBuf,
}

const PROGRAM_COLUMNS: &str = "code, name, url, plan_url, about_html, faq_text";
const COURSE_COLUMNS: &str = "program_code, name, semester, type, hours, credits, raw, tags";

impl Repository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let repo = Self { path };
        repo.init()?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    pub fn init(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS programs (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                plan_url TEXT,
                about_html TEXT,
                faq_text TEXT
            );
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                program_code TEXT NOT NULL,
                name TEXT NOT NULL,
                semester INTEGER,
                type TEXT,
                hours INTEGER,
                credits REAL,
                raw TEXT,
                tags TEXT,
                FOREIGN KEY(program_code) REFERENCES programs(code)
            );
            CREATE INDEX IF NOT EXISTS idx_courses_program ON courses(program_code);
            "#,
        )?;
        Ok(())
    }

    pub fn upsert_program(&self, program: &Program) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            r#"
            INSERT INTO programs (code, name, url, plan_url, about_html, faq_text)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                plan_url = excluded.plan_url,
                about_html = excluded.about_html,
                faq_text = excluded.faq_text
            "#,
            params![
                program.code,
                program.name,
                program.url,
                program.plan_url,
                program.about_html,
                program.faq_text
            ],
        )?;
        Ok(())
    }

    /// Drops every stored course of the program and inserts `courses` in
    /// their place, atomically.
    pub fn replace_courses(&self, program_code: &str, courses: &[Course]) -> Result<usize> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM courses WHERE program_code = ?1",
            params![program_code],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO courses ({COURSE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ))?;
            for course in courses {
                stmt.execute(params![
                    program_code,
                    course.name,
                    course.semester,
                    course.kind.as_str(),
                    course.hours,
                    course.credits,
                    course.raw,
                    serde_json::to_string(&course.tags)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(courses.len())
    }

    pub fn get_program(&self, code: &str) -> Result<Option<Program>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE code = ?1"
        ))?;
        Ok(stmt.query_row([code], program_from_row).optional()?)
    }

    pub fn list_programs(&self) -> Result<Vec<Program>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs ORDER BY rowid"
        ))?;
        let rows = stmt.query_map([], program_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Courses in insertion order, optionally limited to one program.
    pub fn list_courses(&self, program_code: Option<&str>) -> Result<Vec<Course>> {
        let conn = self.connection()?;
        let mut courses = Vec::new();
        match program_code {
            Some(code) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COURSE_COLUMNS} FROM courses WHERE program_code = ?1 ORDER BY id"
                ))?;
                let mut rows = stmt.query([code])?;
                while let Some(row) = rows.next()? {
                    courses.push(course_from_row(row)?);
                }
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id"))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    courses.push(course_from_row(row)?);
                }
            }
        }
        Ok(courses)
    }
}

fn program_from_row(row: &Row<'_>) -> rusqlite::Result<Program> {
    Ok(Program {
        code: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        plan_url: row.get(3)?,
        about_html: row.get(4)?,
        faq_text: row.get(5)?,
    })
}

fn course_from_row(row: &Row<'_>) -> Result<Course> {
    let kind: Option<String> = row.get(3)?;
    let tags: Option<String> = row.get(7)?;
    Ok(Course {
        program_code: row.get(0)?,
        name: row.get(1)?,
        semester: row.get(2)?,
        kind: kind.as_deref().map(CourseKind::parse).unwrap_or_default(),
        hours: row.get(4)?,
        credits: row.get(5)?,
        raw: row.get(6)?,
        tags: parse_tags(tags.as_deref()),
    })
}

/// Tags are a JSON array; older rows may hold a comma-separated list.
fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|_| {
        raw.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn program(code: &str) -> Program {
        Program {
            code: code.to_string(),
            name: format!("Программа {code}"),
            url: format!("https://abit.itmo.ru/program/master/{code}"),
            ..Program::default()
        }
    }

    fn course(code: &str, name: &str) -> Course {
        Course {
            semester: Some(1),
            kind: CourseKind::Elective,
            credits: Some(3.0),
            hours: Some(108),
            raw: Some(format!("{name} 3 з.е.")),
            tags: vec!["mlops".to_string(), "cloud".to_string()],
            ..Course::new(code, name)
        }
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data/itmo_advisor.db");
        let repo = Repository::open(&path).unwrap();
        assert!(path.exists());
        assert!(repo.list_programs().unwrap().is_empty());
    }

    #[test]
    fn upsert_updates_existing_program() {
        let dir = tempdir().unwrap();
        let repo = Repository::open(dir.path().join("db.sqlite")).unwrap();
        repo.upsert_program(&program("ai")).unwrap();
        let mut updated = program("ai");
        updated.plan_url = Some("https://example.org/plan.pdf".to_string());
        updated.faq_text = Some("Вопрос?\nОтвет.".to_string());
        repo.upsert_program(&updated).unwrap();
        let programs = repo.list_programs().unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(repo.get_program("ai").unwrap(), Some(updated));
        assert_eq!(repo.get_program("missing").unwrap(), None);
    }

    #[test]
    fn replace_courses_is_full_replace_per_program() {
        let dir = tempdir().unwrap();
        let repo = Repository::open(dir.path().join("db.sqlite")).unwrap();
        repo.upsert_program(&program("ai")).unwrap();
        repo.upsert_program(&program("ai_product")).unwrap();
        repo.replace_courses("ai", &[course("ai", "MLOps"), course("ai", "NLP")])
            .unwrap();
        repo.replace_courses("ai_product", &[course("ai_product", "Продуктовая аналитика")])
            .unwrap();
        repo.replace_courses("ai", &[course("ai", "Компьютерное зрение")])
            .unwrap();

        let ai = repo.list_courses(Some("ai")).unwrap();
        assert_eq!(ai.len(), 1);
        assert_eq!(ai[0], course("ai", "Компьютерное зрение"));
        assert_eq!(repo.list_courses(Some("ai_product")).unwrap().len(), 1);
        assert_eq!(repo.list_courses(None).unwrap().len(), 2);
    }

    #[test]
    fn courses_require_known_program() {
        let dir = tempdir().unwrap();
        let repo = Repository::open(dir.path().join("db.sqlite")).unwrap();
        assert!(repo.replace_courses("ghost", &[course("ghost", "MLOps")]).is_err());
        assert!(repo.list_courses(None).unwrap().is_empty());
    }

    #[test]
    fn program_code_comes_from_argument() {
        let dir = tempdir().unwrap();
        let repo = Repository::open(dir.path().join("db.sqlite")).unwrap();
        repo.upsert_program(&program("ai")).unwrap();
        let unassigned = Course::new("", "Без программы 3 з.е.");
        repo.replace_courses("ai", &[unassigned]).unwrap();
        assert_eq!(repo.list_courses(Some("ai")).unwrap()[0].program_code, "ai");
    }

    #[test]
    fn legacy_comma_tags_are_read() {
        assert_eq!(parse_tags(Some("mlops,cloud")), vec!["mlops", "cloud"]);
        assert_eq!(parse_tags(Some("[\"nlp\"]")), vec!["nlp"]);
        assert!(parse_tags(Some("")).is_empty());
        assert!(parse_tags(None).is_empty());
    }
}
