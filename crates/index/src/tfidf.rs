use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct TfidfConfig {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
        }
    }
}

/// Sparse row: (term index, weight), sorted by term index.
pub type SparseVector = Vec<(usize, f32)>;

#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

impl TfidfVectorizer {
    pub fn new(config: TfidfConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    fn ngrams(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        let min = self.config.ngram_min.max(1);
        let max = self.config.ngram_max.max(min);
        let mut grams = Vec::new();
        for n in min..=max {
            if tokens.len() < n {
                break;
            }
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    /// Learns vocabulary and IDF, returns L2-normalized rows for `docs`.
    pub fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Vec<SparseVector> {
        let grams: Vec<Vec<String>> = docs.iter().map(|d| self.ngrams(d.as_ref())).collect();

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &grams {
            let mut seen: HashSet<&str> = HashSet::new();
            for gram in doc {
                *corpus_freq.entry(gram.as_str()).or_insert(0) += 1;
                if seen.insert(gram.as_str()) {
                    *doc_freq.entry(gram.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(self.config.max_features);
        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n_docs = docs.len() as f32;
        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        grams.iter().map(|doc| self.weigh(doc)).collect()
    }

    /// Projects text onto the learned vocabulary. Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&self.ngrams(text))
    }

    fn weigh(&self, grams: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for gram in grams {
            if let Some(&idx) = self.vocabulary.get(gram) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let mut row: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        normalize(&mut row);
        row
    }
}

fn normalize(row: &mut SparseVector) {
    let norm = row.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for (_, value) in row.iter_mut() {
        *value /= norm;
    }
}

/// Cosine similarity of two L2-normalized sparse rows.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0f32;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}
