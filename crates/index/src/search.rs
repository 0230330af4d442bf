use std::cmp::Ordering;

use crate::tfidf::{cosine_similarity, SparseVector, TfidfConfig, TfidfVectorizer};
use crate::CorpusRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub score: f32,
    pub record: CorpusRecord,
}

/// In-memory TF-IDF index over a small corpus. Blank records are skipped.
#[derive(Debug, Clone, Default)]
pub struct TfidfIndex {
    vectorizer: TfidfVectorizer,
    records: Vec<CorpusRecord>,
    rows: Vec<SparseVector>,
}

impl TfidfIndex {
    pub fn build(records: Vec<CorpusRecord>, config: TfidfConfig) -> Self {
        let records: Vec<CorpusRecord> = records
            .into_iter()
            .filter(|r| !r.text.trim().is_empty())
            .collect();
        let mut vectorizer = TfidfVectorizer::new(config);
        let rows = if records.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
            vectorizer.fit_transform(&texts)
        };
        Self {
            vectorizer,
            records,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vectorizer.vocabulary_len()
    }

    /// Best `top_k` records by cosine similarity. Records with zero
    /// similarity are never returned; ties keep corpus order.
    pub fn query(&self, text: &str, top_k: usize) -> Vec<SearchHit> {
        if self.records.is_empty() || top_k == 0 {
            return Vec::new();
        }
        let query = self.vectorizer.transform(text);
        if query.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx, cosine_similarity(&query, row)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        scored
            .into_iter()
            .map(|(idx, score)| SearchHit {
                score,
                record: self.records[idx].clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocKind;

    fn corpus() -> Vec<CorpusRecord> {
        vec![
            CorpusRecord::faq("ai", "Можно ли поступить без экзамена?\nДа, по портфолио."),
            CorpusRecord::course("ai", "Машинное обучение", "Машинное обучение\nсеместр: 1"),
            CorpusRecord::course("ai", "Компьютерное зрение", "Компьютерное зрение\nсеместр: 2"),
            CorpusRecord::course("ai_product", "Пусто", "   "),
        ]
    }

    #[test]
    fn blank_records_are_not_indexed() {
        let index = TfidfIndex::build(corpus(), TfidfConfig::default());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn best_match_comes_first() {
        let index = TfidfIndex::build(corpus(), TfidfConfig::default());
        let hits = index.query("курс машинное обучение", 5);
        assert_eq!(hits[0].record.key, "ai:Машинное обучение");
        assert!(hits.iter().all(|h| h.score > 0.0));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn faq_is_retrievable() {
        let index = TfidfIndex::build(corpus(), TfidfConfig::default());
        let hits = index.query("можно ли поступить без экзамена", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.kind, DocKind::Faq);
    }

    #[test]
    fn empty_index_and_unknown_terms_return_nothing() {
        let empty = TfidfIndex::build(Vec::new(), TfidfConfig::default());
        assert!(empty.is_empty());
        assert!(empty.query("машинное обучение", 5).is_empty());
        let index = TfidfIndex::build(corpus(), TfidfConfig::default());
        assert!(index.query("погода", 5).is_empty());
        assert!(index.query("обучение", 0).is_empty());
    }

    #[test]
    fn top_k_truncates() {
        let index = TfidfIndex::build(corpus(), TfidfConfig::default());
        assert_eq!(index.query("семестр", 5).len(), 2);
        assert_eq!(index.query("семестр", 1).len(), 1);
    }
}
