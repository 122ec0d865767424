//! Randomised answer order for a quiz session.
//!
//! Placement is by rejection: each answer in turn draws slots uniformly from
//! `[0, n)` until it hits an empty one. Every answer therefore lands
//! uniformly among the slots still free, which makes the whole permutation
//! uniform. Expected cost is O(n²) draws in the worst case; fine for
//! questions capped at [`MAX_ANSWERS`](crate::libjqs::question::MAX_ANSWERS).

use crate::libjqs::pool::QuestionPool;
use crate::libjqs::question::{PossibleAnswer, Question, QuestionType};
use log::{trace, warn};
use rand::{rng, Rng};

/// Shuffles with a freshly seeded thread RNG, so every quiz differs.
///
/// Returns the applied permutation: entry `i` is the new index of the answer
/// that used to be at `i`.
pub fn shuffle(question: &mut Question) -> Vec<usize> {
    shuffle_with(question, &mut rng())
}

pub fn shuffle_with<R: Rng + ?Sized>(question: &mut Question, rng: &mut R) -> Vec<usize> {
    let n = question.possible_answers.len();
    if n == 0 {
        return Vec::new();
    }

    let slots = draw_distinct(n, n, rng);
    trace!("[Shuffle] {:?} -> {:?}", question.text, slots);

    let mut placed: Vec<Option<PossibleAnswer>> = (0..n).map(|_| None).collect();
    for (answer, &slot) in question.possible_answers.drain(..).zip(&slots) {
        placed[slot] = Some(answer);
    }
    question.possible_answers = placed.into_iter().flatten().collect();

    let remapped = question.correct_answers.iter().filter_map(|&old| {
        let new = slots.get(old).copied();
        if new.is_none() {
            warn!("[Shuffle] Dropping correct index {old}; the question has {n} answers.");
        }
        new
    });
    let correct = match question.question_type {
        // A set: which answers are right, not in which order.
        QuestionType::MultiChoice => {
            let mut correct: Vec<usize> = remapped.collect();
            correct.sort_unstable();
            correct.dedup();
            correct
        }
        // Entry k belongs to field k and must keep its place.
        QuestionType::DragNDrop => remapped.collect(),
    };
    question.correct_answers = correct;

    slots
}

/// Shuffles the answers of every question in the pool.
pub fn shuffle_pool<R: Rng + ?Sized>(pool: &mut QuestionPool, rng: &mut R) {
    for question in pool.questions.iter_mut() {
        shuffle_with(question, rng);
    }
}

/// Draws `count` distinct values from `0..n` in random order, by rejection.
pub(crate) fn draw_distinct<R: Rng + ?Sized>(n: usize, count: usize, rng: &mut R) -> Vec<usize> {
    assert!(count <= n, "cannot draw {count} distinct values from {n}");
    let mut taken = vec![false; n];
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count {
        let value = loop {
            let candidate = rng.random_range(0..n);
            if !taken[candidate] {
                break candidate;
            }
        };
        taken[value] = true;
        drawn.push(value);
    }
    drawn
}
