pub mod qa;
pub mod retriever;
pub mod store;

pub use qa::{QaService, NAVIGATION_ONLY, NOT_FOUND, OFF_TOPIC, TOP_K};
pub use retriever::{corpus_records, course_document, Retriever, SharedRetriever};
pub use store::Repository;
