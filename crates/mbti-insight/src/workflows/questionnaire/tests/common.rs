use crate::workflows::questionnaire::{Dimension, Question, QuestionCatalog, Variant};

pub(super) fn catalog() -> QuestionCatalog {
    QuestionCatalog::builtin().expect("builtin catalog parses")
}

pub(super) fn short_questions() -> Vec<Question> {
    catalog()
        .questions(Variant::Short)
        .expect("short variant")
        .to_vec()
}

pub(super) fn question(dimension: &str, direction: i8) -> Question {
    Question {
        text: format!("{dimension} probe"),
        dimension: dimension.to_string(),
        direction,
    }
}

/// One forward-keyed question per dimension, in scoring order.
pub(super) fn balanced_questions() -> Vec<Question> {
    Dimension::ordered()
        .into_iter()
        .map(|dimension| Question::new("probe", dimension, 1))
        .collect()
}
