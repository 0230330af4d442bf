use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::{Course, CourseKind};
use crate::extract::{extract_plan_text, html_to_text, PlanFormat};
use crate::normalization::{contains_any, normalize_line};
use crate::tags::tags_for;

static SEMESTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)семестр[:\s]*(\d+)").unwrap());
static CREDITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+[.,]?\d*)\s*(з\.?е\.?|ECTS|кред)").unwrap());
static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(час(ов|а)?|ч\.)").unwrap());
static ELECTIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(электив|по выбору)").unwrap());

/// Page section headings that look like course rows.
const HEADER_PHRASES: &[&str] = &["партнеры программы", "карьера", "вопросы", "как поступить"];

const MIN_NAME_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurriculumSource {
    PlanDocument,
    PageText,
    Empty,
}

impl CurriculumSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurriculumSource::PlanDocument => "plan",
            CurriculumSource::PageText => "page",
            CurriculumSource::Empty => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedCurriculum {
    pub source: CurriculumSource,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone)]
pub struct CurriculumParser {
    plans_dir: PathBuf,
}

impl CurriculumParser {
    pub fn new(plans_dir: impl Into<PathBuf>) -> Self {
        Self {
            plans_dir: plans_dir.into(),
        }
    }

    pub fn plans_dir(&self) -> &Path {
        &self.plans_dir
    }

    /// Courses for one program: the downloaded plan document when it yields
    /// text, otherwise the stored page HTML.
    pub fn parse_for_program(&self, program_code: &str, about_html: Option<&str>) -> ParsedCurriculum {
        let mut source = CurriculumSource::Empty;
        let mut text = self
            .plan_file(program_code)
            .map(|path| match extract_plan_text(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(program = program_code, path = %path.display(), "plan extraction failed: {err}");
                    String::new()
                }
            })
            .unwrap_or_default();
        if !text.trim().is_empty() {
            source = CurriculumSource::PlanDocument;
        } else if let Some(html) = about_html.filter(|h| !h.trim().is_empty()) {
            text = html_to_text(html);
            source = CurriculumSource::PageText;
        }
        let courses = parse_text_lines(&text)
            .into_iter()
            .map(|mut course| {
                course.program_code = program_code.to_string();
                course.tags = tags_for(&course.name);
                course
            })
            .collect::<Vec<_>>();
        debug!(program = program_code, ?source, courses = courses.len(), "curriculum parsed");
        ParsedCurriculum { source, courses }
    }

    /// First supported plan file whose stem is exactly the program code.
    pub fn plan_file(&self, program_code: &str) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.plans_dir).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.file_stem().and_then(|s| s.to_str()) == Some(program_code))
            .filter(|path| PlanFormat::from_path(path).is_some())
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

/// Heuristic line classifier: semester markers switch the current semester,
/// everything else that survives the filters becomes a course row.
pub fn parse_text_lines(text: &str) -> Vec<Course> {
    let mut courses = Vec::new();
    let mut current_semester: Option<u32> = None;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = SEMESTER_RE.captures(trimmed) {
            current_semester = caps[1].parse().ok();
            continue;
        }
        let name = normalize_line(trimmed);
        if name.chars().count() < MIN_NAME_CHARS {
            continue;
        }
        let credits = CREDITS_RE
            .captures(trimmed)
            .and_then(|caps| caps[1].replace(',', ".").parse::<f64>().ok());
        let hours = HOURS_RE
            .captures(trimmed)
            .and_then(|caps| caps[1].parse::<u32>().ok());
        let kind = if ELECTIVE_RE.is_match(trimmed) {
            CourseKind::Elective
        } else {
            CourseKind::Core
        };
        if contains_any(&trimmed.to_lowercase(), HEADER_PHRASES) {
            continue;
        }
        if trimmed.split_whitespace().count() <= 2 && credits.is_none() && hours.is_none() {
            continue;
        }
        courses.push(Course {
            program_code: String::new(),
            name,
            semester: current_semester,
            kind,
            hours,
            credits,
            raw: Some(trimmed.to_string()),
            tags: Vec::new(),
        });
    }
    courses
}
