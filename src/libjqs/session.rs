//! One sitting of a quiz: which questions are asked, in what order, and how
//! the student did.

use crate::libjqs::pool::QuestionPool;
use crate::libjqs::question::{Question, QuestionType};
use crate::libjqs::shuffle::{draw_distinct, shuffle_pool};
use log::{debug, info, warn};
use rand::{rng, Rng};
use std::time::Duration;

/// What the student gave for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// One tick per possible answer, in display order.
    Choices(Vec<bool>),
    /// One entry per field in the question body, in position order.
    Fields(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub response: Response,
    pub correct: bool,
}

/// Multi-choice: the ticked set must equal the correct set.
/// Drag-and-drop: field `k` must hold the text of answer `correct_answers[k]`.
pub fn grade(question: &Question, response: &Response) -> bool {
    match (question.question_type, response) {
        (QuestionType::MultiChoice, Response::Choices(ticks)) => {
            let answers = question.possible_answers.len();
            (0..answers).all(|i| ticks.get(i).copied().unwrap_or(false) == question.is_correct_answer(i))
                && ticks.iter().skip(answers).all(|tick| !tick)
        }
        (QuestionType::DragNDrop, Response::Fields(entries)) => {
            (0..question.content.field_count()).all(|k| {
                let expected = question
                    .correct_answers
                    .get(k)
                    .and_then(|&idx| question.possible_answers.get(idx));
                match (expected, entries.get(k)) {
                    (Some(answer), Some(entry)) => answer.text == *entry,
                    _ => false,
                }
            })
        }
        (kind, response) => {
            warn!("[Session] {:?} cannot be graded with {:?}.", kind, response);
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub asked: usize,
    pub answered: usize,
    pub correct: usize,
    /// Per asked question, in the order asked. `None` if never answered.
    pub results: Vec<Option<bool>>,
}

impl Report {
    /// Whole-number percentage, rounded down.
    pub fn score_percent(&self) -> usize {
        if self.asked == 0 {
            0
        } else {
            self.correct * 100 / self.asked
        }
    }
}

#[derive(Debug)]
pub struct QuizSession {
    pool: QuestionPool,
    order: Vec<usize>,
    outcomes: Vec<Option<Outcome>>,
    cursor: usize,
}

impl QuizSession {
    pub fn start(pool: QuestionPool) -> Self {
        Self::start_with(pool, &mut rng())
    }

    /// Shuffles every question's answers, then picks the questions to ask.
    pub fn start_with<R: Rng + ?Sized>(mut pool: QuestionPool, rng: &mut R) -> Self {
        shuffle_pool(&mut pool, rng);
        if pool.number_of_questions as usize > pool.len() {
            warn!(
                "[Session] Pool asks for {} questions but holds {}; asking all.",
                pool.number_of_questions,
                pool.len()
            );
        }
        let count = pool.effective_question_count();
        let order = draw_distinct(pool.len(), count, rng);
        info!("[Session] Asking {} of {} questions.", count, pool.len());
        debug!("[Session] Order: {:?}", order);

        QuizSession {
            pool,
            order,
            outcomes: vec![None; count],
            cursor: 0,
        }
    }

    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    /// Number of questions asked in this session.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 0-based position of the current question.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.order.len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.order
            .get(self.cursor)
            .and_then(|&idx| self.pool.question(idx))
    }

    /// Moves to the next question; false if already on the last one.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            false
        } else {
            self.cursor += 1;
            true
        }
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            false
        } else {
            self.cursor -= 1;
            true
        }
    }

    /// Grades and records `response` for the current question, replacing any
    /// earlier answer. `None` when the session has no questions.
    pub fn answer(&mut self, response: Response) -> Option<bool> {
        let correct = grade(self.current()?, &response);
        debug!(
            "[Session] Question {} answered {}.",
            self.cursor + 1,
            if correct { "correctly" } else { "incorrectly" }
        );
        self.outcomes[self.cursor] = Some(Outcome { response, correct });
        Some(correct)
    }

    pub fn outcome(&self, position: usize) -> Option<&Outcome> {
        self.outcomes.get(position).and_then(Option::as_ref)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.pool
            .timed
            .then(|| Duration::from_secs(u64::from(self.pool.time_limit_minutes) * 60))
    }

    pub fn report(&self) -> Report {
        let results: Vec<Option<bool>> = self
            .outcomes
            .iter()
            .map(|outcome| outcome.as_ref().map(|o| o.correct))
            .collect();
        Report {
            asked: results.len(),
            answered: results.iter().filter(|r| r.is_some()).count(),
            correct: results.iter().filter(|r| **r == Some(true)).count(),
            results,
        }
    }
}
