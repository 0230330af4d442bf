use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::info;

use advisor_core::{Course, Program};
use advisor_index::{CorpusRecord, JsonlWriter, SearchHit, TfidfConfig, TfidfIndex};

use crate::store::Repository;

/// Retriever shared between request handlers; rebuilt in place after a sync.
pub type SharedRetriever = Arc<RwLock<Retriever>>;

#[derive(Debug, Clone, Default)]
pub struct Retriever {
    index: TfidfIndex,
}

impl Retriever {
    pub fn build(repo: &Repository) -> Result<Self> {
        let programs = repo.list_programs()?;
        let courses = repo.list_courses(None)?;
        Ok(Self::from_records(corpus_records(&programs, &courses)))
    }

    pub fn from_records(records: Vec<CorpusRecord>) -> Self {
        let index = TfidfIndex::build(records, TfidfConfig::default());
        info!(
            documents = index.len(),
            terms = index.vocabulary_len(),
            "retriever index built"
        );
        Self { index }
    }

    pub fn shared(self) -> SharedRetriever {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn query(&self, question: &str, top_k: usize) -> Vec<SearchHit> {
        self.index.query(question, top_k)
    }

    /// Writes every indexed document as one JSON line and returns the count.
    pub fn export_corpus<W: Write>(&self, writer: W) -> Result<usize> {
        let mut writer = JsonlWriter::new(writer);
        for record in self.index.records() {
            writer.write_record(record)?;
        }
        writer.into_inner().flush()?;
        Ok(self.index.len())
    }
}

pub fn corpus_records(programs: &[Program], courses: &[Course]) -> Vec<CorpusRecord> {
    let mut records = Vec::with_capacity(programs.len() + courses.len());
    for program in programs {
        if let Some(faq) = program.faq_text.as_deref().filter(|t| !t.trim().is_empty()) {
            records.push(CorpusRecord::faq(&program.code, faq));
        }
    }
    for course in courses {
        records.push(CorpusRecord::course(
            &course.program_code,
            &course.name,
            course_document(course),
        ));
    }
    records
}

/// Credits keep their decimal point (`3.0`); tags are joined with `", "`.
pub fn course_document(course: &Course) -> String {
    let opt = |v: Option<String>| v.unwrap_or_default();
    format!(
        "{}\nсеместр: {}\nтип: {}\nчасы: {}\nкредиты: {}\nтеги: {}\n{}",
        course.name,
        opt(course.semester.map(|s| s.to_string())),
        course.kind.as_str(),
        opt(course.hours.map(|h| h.to_string())),
        opt(course.credits.map(|c| format!("{c:?}"))),
        course.tags.join(", "),
        course.raw.as_deref().unwrap_or_default(),
    )
}
