use advisor_scrape::{extract_faq_text, find_plan_link, plan_extension};

const AI_PAGE: &str = include_str!("fixtures/ai_page.html");

#[test]
fn plan_link_found_on_program_page() {
    let link = find_plan_link(AI_PAGE, "https://abit.itmo.ru").unwrap();
    assert_eq!(
        link,
        "https://abit.itmo.ru/file_storage/file/pages/82/ai_plan.pdf"
    );
    assert_eq!(plan_extension(&link), ".pdf");
}

#[test]
fn faq_collects_question_blocks_only() {
    let faq = extract_faq_text(AI_PAGE);
    let chunks: Vec<&str> = faq.split("\n\n").collect();
    assert_eq!(chunks.len(), 2);
    assert_eq!(
        chunks[0],
        "Какие вступительные испытания?\nВступительный экзамен или конкурс портфолио."
    );
    assert!(chunks[1].starts_with("Можно ли учиться онлайн?\n"));
    assert!(!faq.contains("Яндекс"));
}
