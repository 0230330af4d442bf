use advisor_index::{CorpusRecord, TfidfConfig, TfidfIndex};
use proptest::prelude::*;

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "машинное", "обучение", "проект", "данные", "mlops", "nlp", "семестр", "экзамен",
            "продукт", "облако",
        ]),
        0..12,
    )
    .prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn scores_are_bounded_and_sorted(docs in prop::collection::vec(words(), 0..16), query in words(), top_k in 0usize..8) {
        let records: Vec<CorpusRecord> = docs
            .iter()
            .enumerate()
            .map(|(i, text)| CorpusRecord::course("ai", &format!("c{i}"), text.clone()))
            .collect();
        let index = TfidfIndex::build(records, TfidfConfig::default());
        let hits = index.query(&query, top_k);
        prop_assert!(hits.len() <= top_k);
        prop_assert!(hits.len() <= index.len());
        for hit in &hits {
            prop_assert!(hit.score > 0.0);
            prop_assert!(hit.score <= 1.0 + 1e-4);
        }
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn a_document_is_its_own_best_match(docs in prop::collection::vec(words(), 1..10)) {
        let records: Vec<CorpusRecord> = docs
            .iter()
            .enumerate()
            .map(|(i, text)| CorpusRecord::course("ai", &format!("c{i}"), text.clone()))
            .collect();
        let index = TfidfIndex::build(records, TfidfConfig::default());
        for record in index.records() {
            let hits = index.query(&record.text, 1);
            prop_assert_eq!(hits.len(), 1);
            prop_assert!((hits[0].score - 1.0).abs() < 1e-4);
        }
    }
}
