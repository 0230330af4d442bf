use std::cmp::Ordering;

use crate::domain::Course;

pub const DEFAULT_LIMIT: usize = 8;
/// Shorter list used by the chat front ends.
pub const REPLY_LIMIT: usize = 6;

/// Background key to the tags an elective should carry to be a good fit.
pub const BACKGROUND_TAGS: &[(&str, &[&str])] = &[
    ("junior_ml", &["mlops", "cv", "nlp", "genai", "bigdata"]),
    ("data_engineer", &["bigdata", "cloud", "mlops"]),
    ("product_manager", &["product", "pm", "genai", "data"]),
    ("backend", &["cloud", "mlops", "arch", "bigdata"]),
    ("research", &["genai", "nlp", "cv", "data"]),
];

const PROJECT_MARKERS: &[&str] = &["проект", "практикум"];

pub fn background_tags(background: &str) -> &'static [&'static str] {
    BACKGROUND_TAGS
        .iter()
        .find(|(key, _)| *key == background)
        .map(|(_, tags)| *tags)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Score {
    tag_matches: usize,
    project_bonus: u8,
    credits: f64,
    hours: u32,
}

impl Score {
    fn of(course: &Course, priority: &[&str]) -> Self {
        let name = course.name.to_lowercase();
        Self {
            tag_matches: course
                .tags
                .iter()
                .filter(|tag| priority.contains(&tag.as_str()))
                .count(),
            project_bonus: u8::from(PROJECT_MARKERS.iter().any(|m| name.contains(m))),
            credits: course.credits.unwrap_or(0.0),
            hours: course.hours.unwrap_or(0),
        }
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.tag_matches
            .cmp(&other.tag_matches)
            .then(self.project_bonus.cmp(&other.project_bonus))
            .then(
                self.credits
                    .partial_cmp(&other.credits)
                    .unwrap_or(Ordering::Equal),
            )
            .then(self.hours.cmp(&other.hours))
    }
}

/// Electives ranked by priority-tag overlap, then hands-on format, then size.
/// Equal scores keep their plan order.
#[derive(Debug, Clone, Default)]
pub struct ElectiveRecommender;

impl ElectiveRecommender {
    pub fn new() -> Self {
        Self
    }

    pub fn recommend(&self, courses: &[Course], background: &str, limit: usize) -> Vec<Course> {
        let priority = background_tags(background);
        let mut scored: Vec<(Score, &Course)> = courses
            .iter()
            .filter(|course| course.is_elective())
            .map(|course| (Score::of(course, priority), course))
            .collect();
        scored.sort_by(|a, b| b.0.rank(&a.0));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, course)| course.clone())
            .collect()
    }
}
