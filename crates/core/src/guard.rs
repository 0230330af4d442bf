use crate::normalization::contains_any;

/// Topic fragments that mark a question as being about the programs.
pub const ALLOWED_THEMES: &[&str] = &[
    "итмо",
    "магистратур",
    "мастер",
    "ai",
    "искусствен",
    "продукт",
    "поступлен",
    "экзамен",
    "учебн",
    "план",
    "курс",
    "семестр",
    "зачет",
    "з.е",
    "ects",
    "расписан",
    "стипенд",
    "стажиров",
    "электив",
    "по выбору",
    "портфолио",
    "вкрд",
    "вкр",
];

pub fn is_in_domain(question: &str) -> bool {
    contains_any(&question.to_lowercase(), ALLOWED_THEMES)
}
