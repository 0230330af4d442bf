use std::io::{BufRead, Write};

use anyhow::Result;

use advisor_core::{
    BackgroundPolicy, Course, ElectiveRecommender, Session, Step, CONSOLE_ASK_PROGRAM,
    NO_RECOMMENDATIONS, REPLY_LIMIT, WELCOME,
};
use advisor_rag::{QaService, Repository};

const PROMPT: &str = "> ";
const RECOMMEND: &str = ":reco";
const SWITCH: &str = ":switch";

/// `- {name} (сем {sem}, теги: {tags})`, one line per course.
pub fn course_lines(courses: &[Course]) -> String {
    courses
        .iter()
        .map(|c| {
            format!(
                "- {} (сем {}, теги: {})",
                c.name,
                c.semester_label(),
                c.tags_label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interactive loop over any line source; stdin/stdout in the binary.
pub struct Console<'a> {
    repo: &'a Repository,
    qa: &'a QaService,
    recommender: ElectiveRecommender,
    session: Session,
}

impl<'a> Console<'a> {
    pub fn new(repo: &'a Repository, qa: &'a QaService) -> Self {
        Self {
            repo,
            qa,
            recommender: ElectiveRecommender::new(),
            session: Session::new(),
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        writeln!(out, "{WELCOME}")?;
        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let text = line.trim();
            if text == "exit" || text == "quit" {
                break;
            }
            let reply = self.handle(text)?;
            writeln!(out, "{reply}")?;
        }
        Ok(())
    }

    fn handle(&mut self, text: &str) -> Result<String> {
        if text == SWITCH {
            self.session.switch_program();
            return Ok(CONSOLE_ASK_PROGRAM.to_string());
        }
        if text == RECOMMEND && self.session.is_ready() {
            return self.recommend();
        }
        Ok(match self.session.step(text, BackgroundPolicy::Lenient) {
            Step::Question(question) => self
                .qa
                .answer(self.session.program_code.as_deref(), &question),
            other => other.console_reply().unwrap_or_default(),
        })
    }

    fn recommend(&self) -> Result<String> {
        let program = self.session.program_code.as_deref().unwrap_or_default();
        let background = self.session.background_key.as_deref().unwrap_or_default();
        let courses = self.repo.list_courses(Some(program))?;
        let recs = self.recommender.recommend(&courses, background, REPLY_LIMIT);
        if recs.is_empty() {
            return Ok(NO_RECOMMENDATIONS.to_string());
        }
        Ok(course_lines(&recs))
    }
}
