mod config;
mod curriculum;
mod dialog;
mod domain;
mod error;
mod extract;
mod guard;
mod normalization;
mod recommender;
mod tags;

pub use config::{default_programs, AdvisorConfig, ProgramConfig, DEFAULT_CONFIG};
pub use curriculum::{parse_text_lines, CurriculumParser, CurriculumSource, ParsedCurriculum};
pub use dialog::{
    format_recommendations, map_background, BackgroundPolicy, Session, Step, ASK_PROGRAM,
    BACKGROUND_HELP, CONSOLE_ASK_BACKGROUND, CONSOLE_ASK_PROGRAM, CONSOLE_READY, NEED_PROGRAM,
    NO_RECOMMENDATIONS, PROGRAM_CODES, SWITCHED, SYNC_DONE, WELCOME,
};
pub use domain::{Course, CourseKind, Program};
pub use error::{AdvisorError, Result};
pub use extract::{extract_plan_text, html_to_text, PlanFormat};
pub use guard::{is_in_domain, ALLOWED_THEMES};
pub use normalization::{first_line, normalize_line};
pub use recommender::{
    background_tags, ElectiveRecommender, DEFAULT_LIMIT, REPLY_LIMIT,
};
pub use tags::tags_for;
