use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Decides what an automated player answers. `accuracy` is the probability, in `[0, 1]`,
/// of producing a valid unused answer on a given turn.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerPolicy {
    accuracy: f64,
}

impl AnswerPolicy {
    pub fn new(accuracy: f64) -> Self {
        let accuracy = if accuracy.is_nan() {
            0.0
        } else {
            accuracy.clamp(0.0, 1.0)
        };
        AnswerPolicy { accuracy }
    }

    pub fn flawless() -> Self {
        AnswerPolicy::new(1.0)
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn answer(
        &self,
        valid_answers: &HashSet<String>,
        used_words: &HashSet<String>,
    ) -> Option<String> {
        let mut rng = thread_rng();
        if !rng.gen_bool(self.accuracy) {
            return None;
        }

        let mut candidates: Vec<&String> = valid_answers
            .iter()
            .filter(|word| !used_words.contains(*word))
            .collect();
        // HashSet order is not stable, sort so the choice only depends on the rng
        candidates.sort();
        candidates.choose(&mut rng).map(|word| word.to_string())
    }
}
