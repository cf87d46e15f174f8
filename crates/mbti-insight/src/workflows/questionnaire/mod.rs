//! Questionnaire catalog, test sessions, and the scoring engine that turns Likert answers
//! into a four-letter type.

mod catalog;
pub mod domain;
pub mod scoring;
mod session;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, QuestionCatalog};
pub use domain::{
    Answer, Dimension, InvalidTypeCode, MbtiResult, PersonalityType, Preference, Question,
    Variant, LIKERT_MAX, LIKERT_MIN, UNKNOWN_CODE,
};
pub use scoring::{
    score, score_detailed, tally, DimensionTally, PoleTally, ScoringError, TallyEntry,
};
pub use session::{SessionError, SessionProgress, SessionStep, TestSession};
