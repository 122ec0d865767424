use crate::libjqs::content::RichContent;
use serde::{Deserialize, Serialize};

/// The editor refuses to add more answers than this to one question.
pub const MAX_ANSWERS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultiChoice,
    DragNDrop,
}

impl QuestionType {
    /// Code used in `.jqs` files.
    pub fn code(self) -> u8 {
        match self {
            QuestionType::MultiChoice => 1,
            QuestionType::DragNDrop => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<QuestionType> {
        match code {
            1 => Some(QuestionType::MultiChoice),
            2 => Some(QuestionType::DragNDrop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleAnswer {
    pub text: String,
    #[serde(default)]
    pub explanation: String,
    /// Only used by drag-and-drop answers.
    #[serde(default)]
    pub order: i32,
}

impl PossibleAnswer {
    pub fn new(text: impl Into<String>) -> Self {
        PossibleAnswer {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_explanation(text: impl Into<String>, explanation: impl Into<String>) -> Self {
        PossibleAnswer {
            text: text.into(),
            explanation: explanation.into(),
            order: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stem shown above the answers, or the instructions of a drag-and-drop question.
    pub text: String,
    pub question_type: QuestionType,
    pub possible_answers: Vec<PossibleAnswer>,
    /// 0-based indices into `possible_answers`. For drag-and-drop questions
    /// entry `k` is the answer expected in the `k`th field of `content`.
    pub correct_answers: Vec<usize>,
    #[serde(default)]
    pub hint_text: String,
    #[serde(default)]
    pub explain_text: String,
    #[serde(default)]
    pub marked: bool,
    #[serde(default)]
    pub content: RichContent,
}

impl Question {
    pub fn new(question_type: QuestionType) -> Self {
        Question {
            text: String::new(),
            question_type,
            possible_answers: Vec::new(),
            correct_answers: Vec::new(),
            hint_text: String::new(),
            explain_text: String::new(),
            marked: false,
            content: RichContent::new(),
        }
    }

    pub fn is_correct_answer(&self, index: usize) -> bool {
        self.correct_answers.contains(&index)
    }

    /// Texts of the correct answers, in `correct_answers` order.
    pub fn correct_texts(&self) -> Vec<&str> {
        self.correct_answers
            .iter()
            .filter_map(|&idx| self.possible_answers.get(idx))
            .map(|answer| answer.text.as_str())
            .collect()
    }
}

/// Label shown next to answer `index`: `A`..`Z`, then `A1`..`Z1`, `A2`...
pub fn answer_label(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{letter}{round}"),
    }
}

/// Inverse of [`answer_label`], case-insensitive.
pub fn parse_answer_label(label: &str) -> Option<usize> {
    let label = label.trim();
    let mut chars = label.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let rest = chars.as_str();
    let round = if rest.is_empty() {
        0
    } else {
        match rest.parse::<usize>() {
            Ok(0) | Err(_) => return None,
            Ok(round) => round,
        }
    };
    Some(round * 26 + (letter as u8 - b'A') as usize)
}
