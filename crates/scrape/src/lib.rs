//! Program page scraping: HTML heuristics, plan downloads and the sync
//! pipeline that feeds the repository.

mod html;
mod pipeline;
mod scraper;

pub use html::{extract_faq_text, find_plan_link, text_content};
pub use pipeline::{refresh_courses, sync_all, ProgramSummary};
pub use scraper::{plan_extension, Scraper, SyncedProgram};
