use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::QuestionCatalog;
use super::domain::{is_likert, Answer, MbtiResult, Question, Variant};
use super::scoring::score;

/// One test run: the chosen variant, its questions, and the answers collected so far.
///
/// Sessions are plain values owned by the caller. Starting a new test means building a new
/// session; nothing is shared between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSession {
    variant: Variant,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    cursor: usize,
}

/// Position report used to drive prompts ("3/8") and navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_first: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Question(SessionProgress),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("question catalog has no '{0}' variant")]
    VariantUnavailable(Variant),
    #[error("answer {0} is outside the 1-5 scale")]
    AnswerOutOfRange(i32),
}

impl TestSession {
    pub fn start(catalog: &QuestionCatalog, variant: Variant) -> Result<Self, SessionError> {
        let questions = catalog
            .questions(variant)
            .filter(|questions| !questions.is_empty())
            .ok_or(SessionError::VariantUnavailable(variant))?
            .to_vec();

        debug!(%variant, total = questions.len(), "test session started");
        Ok(Self {
            variant,
            answers: vec![None; questions.len()],
            questions,
            cursor: 0,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.cursor]
    }

    pub fn current_answer(&self) -> Answer {
        self.answers[self.cursor]
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            position: self.cursor + 1,
            total: self.questions.len(),
            answered: self.answers.iter().filter(|answer| answer.is_some()).count(),
            is_first: self.cursor == 0,
            is_last: self.cursor + 1 == self.questions.len(),
        }
    }

    /// Stores a response for the current question. Off-scale values are refused and the
    /// previous answer is kept.
    pub fn record(&mut self, value: i32) -> Result<(), SessionError> {
        if !is_likert(value) {
            warn!(value, position = self.cursor, "ignoring invalid answer value");
            return Err(SessionError::AnswerOutOfRange(value));
        }
        self.answers[self.cursor] = Some(value);
        Ok(())
    }

    /// Moves to the next question, or reports completion when already on the last one.
    pub fn advance(&mut self) -> SessionStep {
        if self.cursor + 1 < self.questions.len() {
            self.cursor += 1;
            SessionStep::Question(self.progress())
        } else {
            SessionStep::Complete
        }
    }

    /// Moves to the previous question; stays put on the first one.
    pub fn retreat(&mut self) -> SessionProgress {
        self.cursor = self.cursor.saturating_sub(1);
        self.progress()
    }

    pub fn finish(&self) -> MbtiResult {
        score(&self.answers, &self.questions)
    }
}
