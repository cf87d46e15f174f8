use serde::Serialize;
use tracing::warn;

use super::domain::{
    is_likert, reverse_likert, Answer, Dimension, MbtiResult, PersonalityType, Question,
};

/// Accumulated weight for the two poles of one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoleTally {
    pub first: u64,
    pub second: u64,
}

impl PoleTally {
    /// Ties go to the second pole.
    pub fn favors_second(&self) -> bool {
        self.first <= self.second
    }
}

/// Per-dimension accumulators, rebuilt from scratch on every scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionTally {
    poles: [PoleTally; 4],
}

impl DimensionTally {
    pub fn get(&self, dimension: Dimension) -> PoleTally {
        self.poles[dimension.index()]
    }

    fn add(&mut self, dimension: Dimension, first: i32, second: i32) {
        let pole = &mut self.poles[dimension.index()];
        pole.first += first as u64;
        pole.second += second as u64;
    }

    pub fn resolve(&self) -> PersonalityType {
        let mut picks = [false; 4];
        for dimension in Dimension::ordered() {
            picks[dimension.index()] = self.get(dimension).favors_second();
        }
        PersonalityType::from_picks(picks)
    }

    pub fn entries(&self) -> Vec<TallyEntry> {
        Dimension::ordered()
            .into_iter()
            .map(|dimension| {
                let (first, second) = dimension.poles();
                let tally = self.get(dimension);
                TallyEntry {
                    dimension: dimension.label(),
                    first_letter: first.letter(),
                    first_score: tally.first,
                    second_letter: second.letter(),
                    second_score: tally.second,
                }
            })
            .collect()
    }
}

/// Flattened view of one dimension's accumulators for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub dimension: &'static str,
    pub first_letter: char,
    pub first_score: u64,
    pub second_letter: char,
    pub second_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("received {answers} answers for {questions} questions")]
    LengthMismatch { answers: usize, questions: usize },
    #[error("answer {value} at position {position} is outside the 1-5 scale")]
    OutOfRange { position: usize, value: i32 },
}

/// Scores an answer sequence against its questions. Never fails: malformed input yields
/// [`MbtiResult::Unknown`] and a warning.
pub fn score(answers: &[Answer], questions: &[Question]) -> MbtiResult {
    score_detailed(answers, questions).0
}

/// [`score`] plus the accumulators it resolved from, when the input was scoreable.
pub fn score_detailed(
    answers: &[Answer],
    questions: &[Question],
) -> (MbtiResult, Option<DimensionTally>) {
    match tally(answers, questions) {
        Ok(tally) => (MbtiResult::Type(tally.resolve()), Some(tally)),
        Err(error) => {
            warn!(%error, "scoring input rejected");
            (MbtiResult::Unknown, None)
        }
    }
}

/// Builds the accumulators, skipping positions that cannot be scored.
pub fn tally(answers: &[Answer], questions: &[Question]) -> Result<DimensionTally, ScoringError> {
    if answers.len() != questions.len() {
        return Err(ScoringError::LengthMismatch {
            answers: answers.len(),
            questions: questions.len(),
        });
    }

    for (position, answer) in answers.iter().enumerate() {
        match *answer {
            Some(value) if !is_likert(value) => {
                return Err(ScoringError::OutOfRange { position, value });
            }
            _ => {}
        }
    }

    let mut tally = DimensionTally::default();
    for (position, (answer, question)) in answers.iter().zip(questions).enumerate() {
        let Some(value) = *answer else {
            warn!(position, "skipping unanswered question");
            continue;
        };
        let Some(dimension) = question.parsed_dimension() else {
            warn!(
                position,
                dimension = %question.dimension,
                "skipping question with malformed dimension"
            );
            continue;
        };

        match question.direction.signum() {
            1 => tally.add(dimension, value, reverse_likert(value)),
            -1 => tally.add(dimension, reverse_likert(value), value),
            _ => warn!(position, "skipping question without a direction"),
        }
    }

    Ok(tally)
}
