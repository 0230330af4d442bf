use tracing::debug;

use advisor_core::{first_line, is_in_domain};
use advisor_index::DocKind;

use crate::retriever::SharedRetriever;

pub const OFF_TOPIC: &str = "Хэй! Я отвечаю только на вопросы по обучению на магистерских программах \
«Искусственный интеллект» и «AI Product» ИТМО. Переформулируйте, пожалуйста, в рамках темы.";
pub const NOT_FOUND: &str = "Не нашёл ответа в учебных планах и описании программ. \
Попробуйте перефразировать или спросить о других деталях обучения.";
pub const NAVIGATION_ONLY: &str =
    "Не нашёл точного ответа, но могу помочь с навигацией по курсам и FAQ.";

pub const TOP_K: usize = 5;

/// Answers in-domain questions from the retriever's top hits.
#[derive(Clone)]
pub struct QaService {
    retriever: SharedRetriever,
}

impl QaService {
    pub fn new(retriever: SharedRetriever) -> Self {
        Self { retriever }
    }

    pub fn retriever(&self) -> &SharedRetriever {
        &self.retriever
    }

    /// Course hits from other programs are skipped once a program is
    /// selected. FAQ hits of either program are always quoted.
    pub fn answer(&self, program_code: Option<&str>, question: &str) -> String {
        if !is_in_domain(question) {
            debug!("question rejected by domain guard");
            return OFF_TOPIC.to_string();
        }
        let hits = self.retriever.read().query(question, TOP_K);
        if hits.is_empty() {
            return NOT_FOUND.to_string();
        }
        let parts: Vec<String> = hits
            .iter()
            .filter(|hit| {
                hit.record.kind == DocKind::Faq
                    || program_code.map_or(true, |code| hit.record.program_code() == code)
            })
            .filter_map(|hit| match hit.record.kind {
                DocKind::Faq => Some(format!(
                    "• Из FAQ программы: {}",
                    first_line(&hit.record.text)
                )),
                DocKind::Course => hit
                    .record
                    .course_name()
                    .map(|name| format!("• Курс «{name}» — возможно релевантно вашему вопросу")),
            })
            .take(TOP_K)
            .collect();
        debug!(hits = hits.len(), parts = parts.len(), "qa answer assembled");
        if parts.is_empty() {
            return NAVIGATION_ONLY.to_string();
        }
        parts.join("\n")
    }
}
