pub mod analysis;
pub mod proxy;
pub mod questionnaire;
