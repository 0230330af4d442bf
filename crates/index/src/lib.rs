use std::io::Write;

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod search;
mod tfidf;

pub use search::{SearchHit, TfidfIndex};
pub use tfidf::{cosine_similarity, tokenize, SparseVector, TfidfConfig, TfidfVectorizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Faq,
    Course,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Faq => "faq",
            DocKind::Course => "course",
        }
    }
}

/// One retrievable document. `key` is the program code for FAQ documents and
/// `"{program}:{course name}"` for courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub kind: DocKind,
    pub key: String,
    pub text: String,
}

impl CorpusRecord {
    pub fn faq(program_code: &str, text: impl Into<String>) -> Self {
        Self {
            kind: DocKind::Faq,
            key: program_code.to_string(),
            text: text.into(),
        }
    }

    pub fn course(program_code: &str, name: &str, text: impl Into<String>) -> Self {
        Self {
            kind: DocKind::Course,
            key: format!("{program_code}:{name}"),
            text: text.into(),
        }
    }

    /// Program code the record belongs to.
    pub fn program_code(&self) -> &str {
        match self.kind {
            DocKind::Faq => &self.key,
            DocKind::Course => self.key.split_once(':').map(|(p, _)| p).unwrap_or(&self.key),
        }
    }

    /// Course name for course records; `None` for FAQ records.
    pub fn course_name(&self) -> Option<&str> {
        match self.kind {
            DocKind::Faq => None,
            DocKind::Course => self.key.split_once(':').map(|(_, name)| name),
        }
    }
}

pub struct JsonlWriter<W> {
    writer: W,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let mut buf = serde_json::to_vec(record)?;
        buf.push(b'\n');
        self.writer.write_all(&buf)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_writer_emits_one_record_per_line() {
        let mut writer = JsonlWriter::new(Vec::new());
        writer
            .write_record(&CorpusRecord::faq("ai", "Можно ли учиться онлайн?\nДа."))
            .unwrap();
        writer
            .write_record(&CorpusRecord::course("ai", "MLOps", "MLOps\nсеместр: 2"))
            .unwrap();
        let buf = writer.into_inner();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: CorpusRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.kind, DocKind::Course);
        assert_eq!(parsed.key, "ai:MLOps");
    }

    #[test]
    fn course_keys_split_on_first_colon() {
        let record = CorpusRecord::course("ai_product", "Data: основы", "");
        assert_eq!(record.program_code(), "ai_product");
        assert_eq!(record.course_name(), Some("Data: основы"));
        let faq = CorpusRecord::faq("ai", "");
        assert_eq!(faq.program_code(), "ai");
        assert_eq!(faq.course_name(), None);
    }
}
