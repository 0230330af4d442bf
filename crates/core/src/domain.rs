use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Program {
    pub code: String,
    pub name: String,
    pub url: String,
    pub plan_url: Option<String>,
    pub about_html: Option<String>,
    pub faq_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    #[default]
    Core,
    Elective,
}

impl CourseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseKind::Core => "core",
            CourseKind::Elective => "elective",
        }
    }

    /// Anything that is not `elective` is treated as a core course.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "elective" => CourseKind::Elective,
            _ => CourseKind::Core,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Course {
    pub program_code: String,
    pub name: String,
    pub semester: Option<u32>,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    pub hours: Option<u32>,
    pub credits: Option<f64>,
    pub raw: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Course {
    pub fn new(program_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            program_code: program_code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Plan rows sometimes mark electives only in the raw text ("по выбору").
    pub fn is_elective(&self) -> bool {
        self.kind == CourseKind::Elective
            || self
                .raw
                .as_deref()
                .map(|raw| raw.to_lowercase().contains("по выбору"))
                .unwrap_or(false)
    }

    pub fn semester_label(&self) -> String {
        self.semester
            .map(|s| s.to_string())
            .unwrap_or_else(|| "—".to_string())
    }

    pub fn tags_label(&self) -> String {
        if self.tags.is_empty() {
            "—".to_string()
        } else {
            self.tags.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_leniently() {
        assert_eq!(CourseKind::parse("elective"), CourseKind::Elective);
        assert_eq!(CourseKind::parse(" Elective "), CourseKind::Elective);
        assert_eq!(CourseKind::parse("core"), CourseKind::Core);
        assert_eq!(CourseKind::parse("whatever"), CourseKind::Core);
    }

    #[test]
    fn raw_marker_makes_course_elective() {
        let mut course = Course::new("ai", "Компьютерное зрение");
        assert!(!course.is_elective());
        course.raw = Some("Компьютерное зрение (дисциплина ПО ВЫБОРУ)".to_string());
        assert!(course.is_elective());
    }

    #[test]
    fn labels_fall_back_to_dash() {
        let mut course = Course::new("ai", "NLP");
        assert_eq!(course.semester_label(), "—");
        assert_eq!(course.tags_label(), "—");
        course.semester = Some(2);
        course.tags = vec!["nlp".into(), "genai".into()];
        assert_eq!(course.semester_label(), "2");
        assert_eq!(course.tags_label(), "nlp, genai");
    }

    #[test]
    fn course_serializes_kind_as_type() {
        let course = Course {
            kind: CourseKind::Elective,
            ..Course::new("ai", "MLOps")
        };
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(value["type"], "elective");
    }
}
