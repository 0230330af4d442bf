use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use advisor_core::{AdvisorConfig, CurriculumParser, CurriculumSource};
use advisor_rag::Repository;

use crate::scraper::Scraper;

/// Outcome of refreshing one program's curriculum.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramSummary {
    pub code: String,
    pub plan_file: Option<PathBuf>,
    #[serde(serialize_with = "source_label")]
    pub source: CurriculumSource,
    pub courses: usize,
}

fn source_label<S: serde::Serializer>(source: &CurriculumSource, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(source.as_str())
}

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} courses from {}",
            self.code,
            self.courses,
            self.source.as_str()
        )?;
        if let Some(path) = &self.plan_file {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}

/// Re-parses the curriculum of every stored program and replaces its
/// courses.
pub fn refresh_courses(repo: &Repository, parser: &CurriculumParser) -> Result<Vec<ProgramSummary>> {
    let mut summaries = Vec::new();
    for program in repo.list_programs()? {
        let parsed = parser.parse_for_program(&program.code, program.about_html.as_deref());
        let stored = repo.replace_courses(&program.code, &parsed.courses)?;
        info!(
            program = %program.code,
            source = parsed.source.as_str(),
            courses = stored,
            "curriculum stored"
        );
        summaries.push(ProgramSummary {
            plan_file: parser.plan_file(&program.code),
            code: program.code,
            source: parsed.source,
            courses: stored,
        });
    }
    Ok(summaries)
}

/// Scrapes every configured program, downloads plans, then refreshes the
/// stored courses.
pub fn sync_all(config: &AdvisorConfig, repo: &Repository) -> Result<Vec<ProgramSummary>> {
    let scraper = Scraper::new(config.clone(), repo.clone())?;
    let synced = scraper.full_sync()?;
    info!(programs = synced.len(), "program pages synced");
    refresh_courses(repo, &CurriculumParser::new(config.plans_dir()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::Program;
    use tempfile::tempdir;

    #[test]
    fn summary_renders_source_and_plan() {
        let summary = ProgramSummary {
            code: "ai".into(),
            plan_file: Some(PathBuf::from("data/plans/ai.pdf")),
            source: CurriculumSource::PlanDocument,
            courses: 12,
        };
        assert_eq!(summary.to_string(), "ai: 12 courses from plan (data/plans/ai.pdf)");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["source"], "plan");
    }

    #[test]
    fn refresh_replaces_courses_from_page_text() {
        let dir = tempdir().unwrap();
        let repo = Repository::open(dir.path().join("db.sqlite")).unwrap();
        repo.upsert_program(&Program {
            code: "ai".into(),
            name: "Искусственный интеллект".into(),
            url: "https://abit.itmo.ru/program/master/ai".into(),
            about_html: Some(
                "<p>Семестр 1</p><p>Машинное обучение 6 з.е.</p><p>Генеративные модели (электив) 3 з.е.</p>"
                    .into(),
            ),
            ..Program::default()
        })
        .unwrap();
        repo.upsert_program(&Program {
            code: "ai_product".into(),
            name: "AI Product".into(),
            url: "https://abit.itmo.ru/program/master/ai_product".into(),
            ..Program::default()
        })
        .unwrap();

        let parser = CurriculumParser::new(dir.path().join("plans"));
        let summaries = refresh_courses(&repo, &parser).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].source, CurriculumSource::PageText);
        assert_eq!(summaries[0].courses, 2);
        assert_eq!(summaries[1].source, CurriculumSource::Empty);

        let courses = repo.list_courses(Some("ai")).unwrap();
        assert_eq!(courses[1].tags, vec!["genai"]);
        assert!(courses[1].is_elective());

        // A second pass replaces rather than appends.
        refresh_courses(&repo, &parser).unwrap();
        assert_eq!(repo.list_courses(Some("ai")).unwrap().len(), 2);
    }
}
