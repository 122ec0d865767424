use crate::libjqs::question::Question;
use log::debug;
use serde::{Deserialize, Serialize};

/// A set of questions plus the recommended quiz configuration; one `.jqs` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionPool {
    pub description: String,
    /// May the student change the configuration before starting?
    pub change_allowed: bool,
    pub is_exam: bool,
    pub timed: bool,
    pub time_limit_minutes: u32,
    pub display_final_score: bool,
    pub display_print_option: bool,
    pub student_name: String,
    /// 0 means all questions.
    pub number_of_questions: u32,
    pub questions: Vec<Question>,
}

impl Default for QuestionPool {
    fn default() -> Self {
        QuestionPool {
            description: String::from("This is a pool of questions."),
            change_allowed: true,
            is_exam: false,
            timed: false,
            time_limit_minutes: 0,
            display_final_score: true,
            display_print_option: true,
            student_name: String::from("Student Name"),
            number_of_questions: 0,
            questions: Vec::new(),
        }
    }
}

impl QuestionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn remove_question(&mut self, index: usize) -> Option<Question> {
        if index < self.questions.len() {
            Some(self.questions.remove(index))
        } else {
            None
        }
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    /// Drops every question, keeping the configuration.
    pub fn clear(&mut self) {
        self.questions.clear();
    }

    /// Back to a brand-new pool.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Open-and-append: takes `other`'s questions, keeps this pool's configuration.
    pub fn append(&mut self, other: QuestionPool) {
        debug!(
            "[Pool] Appending {} questions to {}.",
            other.len(),
            self.len()
        );
        self.questions.extend(other.questions);
    }

    pub fn marked_count(&self) -> usize {
        self.questions.iter().filter(|q| q.marked).count()
    }

    /// Same configuration, only the marked questions.
    pub fn marked_only(&self) -> QuestionPool {
        QuestionPool {
            questions: self.questions.iter().filter(|q| q.marked).cloned().collect(),
            ..self.config_only()
        }
    }

    /// Deletes marked questions and returns how many went.
    pub fn remove_marked(&mut self) -> usize {
        let before = self.questions.len();
        self.questions.retain(|q| !q.marked);
        before - self.questions.len()
    }

    /// How many questions a quiz on this pool asks.
    pub fn effective_question_count(&self) -> usize {
        match self.number_of_questions as usize {
            0 => self.len(),
            n => n.min(self.len()),
        }
    }

    fn config_only(&self) -> QuestionPool {
        QuestionPool {
            description: self.description.clone(),
            change_allowed: self.change_allowed,
            is_exam: self.is_exam,
            timed: self.timed,
            time_limit_minutes: self.time_limit_minutes,
            display_final_score: self.display_final_score,
            display_print_option: self.display_print_option,
            student_name: self.student_name.clone(),
            number_of_questions: self.number_of_questions,
            questions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libjqs::question::QuestionType;

    fn question(text: &str, marked: bool) -> Question {
        let mut q = Question::new(QuestionType::MultiChoice);
        q.text = text.to_string();
        q.marked = marked;
        q
    }

    #[test]
    fn new_pools_use_the_documented_defaults() {
        let pool = QuestionPool::new();
        assert_eq!(pool.description, "This is a pool of questions.");
        assert!(pool.change_allowed);
        assert!(!pool.is_exam);
        assert!(pool.display_final_score);
        assert_eq!(pool.student_name, "Student Name");
        assert_eq!(pool.number_of_questions, 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn marked_helpers() {
        let mut pool = QuestionPool::new();
        pool.description = "Capitals".into();
        pool.add_question(question("a", true));
        pool.add_question(question("b", false));
        pool.add_question(question("c", true));

        assert_eq!(pool.marked_count(), 2);
        let marked = pool.marked_only();
        assert_eq!(marked.description, "Capitals");
        assert_eq!(
            marked.iter().map(|q| q.text.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );

        assert_eq!(pool.remove_marked(), 2);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.question(0).map(|q| q.text.as_str()), Some("b"));
    }

    #[test]
    fn append_keeps_own_configuration() {
        let mut pool = QuestionPool::new();
        pool.description = "mine".into();
        pool.add_question(question("a", false));
        let mut other = QuestionPool::new();
        other.description = "theirs".into();
        other.add_question(question("b", false));

        pool.append(other);
        assert_eq!(pool.description, "mine");
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn question_count_is_clamped() {
        let mut pool = QuestionPool::new();
        for t in ["a", "b", "c"] {
            pool.add_question(question(t, false));
        }
        assert_eq!(pool.effective_question_count(), 3);
        pool.number_of_questions = 2;
        assert_eq!(pool.effective_question_count(), 2);
        pool.number_of_questions = 9;
        assert_eq!(pool.effective_question_count(), 3);
    }

    #[test]
    fn out_of_range_access_is_none() {
        let mut pool = QuestionPool::new();
        assert!(pool.question(0).is_none());
        assert!(pool.remove_question(3).is_none());
        pool.add_question(question("a", false));
        pool.reset();
        assert!(pool.is_empty());
    }
}
