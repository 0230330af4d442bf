use advisor_core::{
    format_recommendations, is_in_domain, BackgroundPolicy, CurriculumParser, CurriculumSource,
    ElectiveRecommender, Session, Step,
};

const PAGE: &str = r#"
<html><body>
<p>Семестр 1</p>
<p>Машинное обучение 6 з.е.</p>
<p>Проектный практикум по MLOps (электив) 3 з.е.</p>
<p>Семестр 2</p>
<p>Облачные платформы для Big Data по выбору 4 з.е. 144 часа</p>
<p>Генеративные модели (электив) 3 з.е.</p>
<h3>Как поступить</h3>
<p>Вопросы и ответы о поступлении</p>
</body></html>
"#;

#[test]
fn page_curriculum_feeds_recommendations() {
    let dir = tempfile::tempdir().unwrap();
    let parser = CurriculumParser::new(dir.path().join("plans"));
    let parsed = parser.parse_for_program("ai", Some(PAGE));
    assert_eq!(parsed.source, CurriculumSource::PageText);
    assert_eq!(parsed.courses.len(), 4);
    assert!(parsed.courses.iter().all(|c| c.program_code == "ai"));

    let mut session = Session::new();
    session.step("ai", BackgroundPolicy::Strict);
    session.step("data engineer", BackgroundPolicy::Strict);
    let background = session.background_key.clone().unwrap();
    assert_eq!(background, "data_engineer");

    let recs = ElectiveRecommender::new().recommend(&parsed.courses, &background, 6);
    let names: Vec<&str> = recs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Облачные платформы для Big Data по выбору 4 з.е. 144 часа",
            "Проектный практикум по MLOps (электив) 3 з.е.",
            "Генеративные модели (электив) 3 з.е.",
        ]
    );
    let text = format_recommendations(&recs);
    assert!(text.contains("семестр 2, теги: data, bigdata, cloud"));
}

#[test]
fn questions_reach_qa_only_after_setup() {
    let mut session = Session::new();
    let question = "Сколько зачетных единиц в семестре?";
    assert_eq!(session.step(question, BackgroundPolicy::Strict), Step::AskProgram);
    session.step("ai_product", BackgroundPolicy::Strict);
    session.step("product manager", BackgroundPolicy::Strict);
    assert_eq!(
        session.step(question, BackgroundPolicy::Strict),
        Step::Question(question.to_string())
    );
    assert!(is_in_domain(question));
}
