use crate::libjqs::codec::index::from_file_index;
use crate::libjqs::codec::token::{is_empty_field, parse_number, Tokens};
use crate::libjqs::codec::version::{FormatVersion, FILE_FORMAT_VERSION};
use crate::libjqs::content::{FieldMark, ImageMark, Mark, RichContent};
use crate::libjqs::error::{CorruptFileError, JqsError, Result};
use crate::libjqs::pool::QuestionPool;
use crate::libjqs::question::{PossibleAnswer, Question, QuestionType};
use log::{debug, trace, warn};

/// Builds a fresh pool from an uncompressed token stream.
pub(crate) fn read_payload(payload: &str) -> Result<QuestionPool> {
    let mut tokens = Tokens::new(payload);

    let version: FormatVersion = tokens.raw("format version")?.parse()?;
    if version > FILE_FORMAT_VERSION {
        return Err(JqsError::FileTooNew {
            found: version.to_string(),
            supported: FILE_FORMAT_VERSION.to_string(),
        });
    }
    debug!("[Codec] File format version {}.", version);

    let mut pool = QuestionPool {
        description: tokens.text("description")?,
        change_allowed: tokens.flag("change allowed")?,
        is_exam: tokens.flag("exam flag")?,
        timed: tokens.flag("timed flag")?,
        time_limit_minutes: tokens.number("time limit")?,
        display_final_score: tokens.flag("final score flag")?,
        display_print_option: tokens.flag("print option flag")?,
        student_name: tokens.text("student name")?,
        number_of_questions: tokens.number("number of questions")?,
        questions: Vec::new(),
    };

    while !tokens.is_exhausted() {
        let question = read_question(&mut tokens)?;
        trace!(
            "[Codec] Question {} ends at token {}.",
            pool.len(),
            tokens.position()
        );
        pool.add_question(question);
    }
    Ok(pool)
}

fn read_question(tokens: &mut Tokens<'_>) -> std::result::Result<Question, CorruptFileError> {
    let text = tokens.text("question text")?;
    let hint_text = tokens.text("hint")?;
    let explain_text = tokens.text("explanation")?;

    let code = tokens.raw("question type")?;
    let question_type = code
        .parse()
        .ok()
        .and_then(QuestionType::from_code)
        .ok_or_else(|| CorruptFileError::UnknownQuestionType(code.to_string()))?;

    let answer_count: usize = tokens.number("answer count")?;
    let mut possible_answers = Vec::new();
    for idx in 0..answer_count {
        let text = tokens.text("answer")?;
        let explanation = tokens.text("answer explanation")?;
        // Order is not stored; drag-and-drop answers get their position back.
        let order = match question_type {
            QuestionType::DragNDrop => idx as i32,
            QuestionType::MultiChoice => 0,
        };
        possible_answers.push(PossibleAnswer {
            text,
            explanation,
            order,
        });
    }

    let correct_count: usize = tokens.number("correct answer count")?;
    let mut correct_answers = Vec::new();
    for _ in 0..correct_count {
        let stored: i64 = tokens.number("correct answer index")?;
        correct_answers.push(from_file_index(stored, answer_count)?);
    }

    let content = read_content(tokens)?;

    Ok(Question {
        text,
        question_type,
        possible_answers,
        correct_answers,
        hint_text,
        explain_text,
        marked: false,
        content,
    })
}

/// Text first, then the marks are bound over their placeholder characters.
fn read_content(tokens: &mut Tokens<'_>) -> std::result::Result<RichContent, CorruptFileError> {
    let mut content = RichContent::from_text(&tokens.text("content")?);
    let mut pending: Vec<(usize, Mark)> = Vec::new();

    let image_count: usize = tokens.number("image count")?;
    for _ in 0..image_count {
        let width: u32 = tokens.number("image width")?;
        let height: u32 = tokens.number("image height")?;
        let pos: usize = tokens.number("image position")?;
        let pixels = read_pixels(tokens.raw("image pixels")?, width, height, pos)?;
        pending.push((
            pos,
            Mark::Image(ImageMark {
                width,
                height,
                pixels,
            }),
        ));
    }

    let field_count: usize = tokens.number("field count")?;
    for _ in 0..field_count {
        let pos: usize = tokens.number("field position")?;
        let text = tokens.text("field text")?;
        pending.push((pos, Mark::Field(FieldMark { text })));
    }

    // Binding swaps one character for one mark, so offsets never move; the
    // sort just makes the order explicit.
    pending.sort_by_key(|(pos, _)| *pos);
    for (pos, mark) in pending {
        content.try_bind(pos, mark)?;
    }
    Ok(content)
}

fn read_pixels(
    token: &str,
    width: u32,
    height: u32,
    pos: usize,
) -> std::result::Result<Vec<i32>, CorruptFileError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .ok_or(CorruptFileError::PixelCount {
            pos,
            expected: usize::MAX,
            found: 0,
        })?;
    let mut pixels = if is_empty_field(token) {
        Vec::new()
    } else {
        token
            .split(',')
            .filter(|px| !px.is_empty())
            .map(|px| parse_number("image pixel", px))
            .collect::<std::result::Result<Vec<i32>, _>>()?
    };
    if pixels.len() < expected {
        return Err(CorruptFileError::PixelCount {
            pos,
            expected,
            found: pixels.len(),
        });
    }
    if pixels.len() > expected {
        warn!(
            "[Codec] Image at {} carries {} extra pixels; ignoring them.",
            pos,
            pixels.len() - expected
        );
        pixels.truncate(expected);
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libjqs::content::MarkKind;

    const HEADER: &str = "0.9\u{1F}Capitals\u{1F}T\u{1F}F\u{1F}T\u{1F}15\u{1F}T\u{1F}F\u{1F}\u{06}\u{1F}2\u{1F}";

    fn with_header(rest: &str) -> String {
        format!("{HEADER}{rest}")
    }

    #[test]
    fn reads_the_header() {
        let pool = read_payload(HEADER).unwrap();
        assert_eq!(pool.description, "Capitals");
        assert!(pool.change_allowed);
        assert!(!pool.is_exam);
        assert!(pool.timed);
        assert_eq!(pool.time_limit_minutes, 15);
        assert!(pool.display_final_score);
        assert!(!pool.display_print_option);
        assert_eq!(pool.student_name, "");
        assert_eq!(pool.number_of_questions, 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn reads_files_with_doubled_delimiters() {
        // Older writers put an extra delimiter after the answer and index lists.
        let pool = read_payload(&with_header(
            "Q\u{1F}h\u{1F}e\u{1F}1\u{1F}2\u{1F}Paris\u{1F}\u{06}\u{1F}Rome\u{1F}\u{06}\u{1F}\u{1F}\
             1\u{1F}1\u{1F}\u{1F}\u{06}\u{1F}0\u{1F}0\u{1F}",
        ))
        .unwrap();
        let q = &pool.questions[0];
        assert_eq!(q.possible_answers[0].text, "Paris");
        assert_eq!(q.correct_answers, vec![0]);
        assert!(q.content.is_empty());
    }

    #[test]
    fn binds_marks_regardless_of_tuple_order() {
        let pool = read_payload(&with_header(
            "Q\u{1F}\u{06}\u{1F}\u{06}\u{1F}2\u{1F}2\u{1F}a\u{1F}\u{06}\u{1F}b\u{1F}\u{06}\u{1F}\
             2\u{1F}2\u{1F}1\u{1F}\
             _x_y\u{1F}0\u{1F}2\u{1F}3\u{1F}\u{06}\u{1F}1\u{1F}\u{06}\u{1F}",
        ))
        .unwrap();
        let q = &pool.questions[0];
        assert_eq!(q.question_type, QuestionType::DragNDrop);
        assert_eq!(q.correct_answers, vec![1, 0]);
        assert_eq!(q.possible_answers[1].order, 1);
        let kinds: Vec<(usize, MarkKind)> =
            q.content.marks_in_order().map(|(p, m)| (p, m.kind())).collect();
        assert_eq!(kinds, vec![(1, MarkKind::Field), (3, MarkKind::Field)]);
    }

    #[test]
    fn newer_files_are_refused() {
        match read_payload("0.10\u{1F}") {
            Err(JqsError::FileTooNew { found, supported }) => {
                assert_eq!(found, "0.10");
                assert_eq!(supported, "0.9");
            }
            other => panic!("expected FileTooNew, got {other:?}"),
        }
        for newer in ["0.9.1", "1.0.0"] {
            match read_payload(&format!("{newer}\u{1F}")) {
                Err(JqsError::FileTooNew { found, .. }) => assert_eq!(found, newer),
                other => panic!("expected FileTooNew for {newer}, got {other:?}"),
            }
        }
        assert!(read_payload("0.8\u{1F}").is_err_and(|e| e.is_corrupt()));
        assert!(read_payload("0.9.0\u{1F}").is_err_and(|e| e.is_corrupt()));
    }

    #[test]
    fn corrupt_streams_become_corrupt_errors() {
        let cases = [
            with_header("Q\u{1F}h\u{1F}e\u{1F}3\u{1F}"),
            with_header("Q\u{1F}h\u{1F}e\u{1F}1\u{1F}two\u{1F}"),
            with_header("Q\u{1F}h\u{1F}e\u{1F}1\u{1F}1\u{1F}a\u{1F}b\u{1F}1\u{1F}2\u{1F}"),
            with_header(
                "Q\u{1F}h\u{1F}e\u{1F}1\u{1F}0\u{1F}0\u{1F}ab\u{1F}0\u{1F}1\u{1F}5\u{1F}f\u{1F}",
            ),
            with_header(
                "Q\u{1F}h\u{1F}e\u{1F}1\u{1F}0\u{1F}0\u{1F}ab\u{1F}1\u{1F}2\u{1F}1\u{1F}0\u{1F}7,\u{1F}0\u{1F}",
            ),
            with_header(
                "Q\u{1F}h\u{1F}e\u{1F}1\u{1F}0\u{1F}0\u{1F}ab\u{1F}1\u{1F}1\u{1F}1\u{1F}0\u{1F}7,\u{1F}1\u{1F}0\u{1F}f\u{1F}",
            ),
            "nonsense\u{1F}".to_string(),
        ];
        for payload in cases {
            let err = read_payload(&payload).unwrap_err();
            assert!(err.is_corrupt(), "{err:?} for {payload:?}");
        }
    }

    #[test]
    fn specific_corruption_kinds() {
        let err = read_payload(&with_header(
            "Q\u{1F}h\u{1F}e\u{1F}1\u{1F}0\u{1F}0\u{1F}ab\u{1F}0\u{1F}1\u{1F}5\u{1F}f\u{1F}",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            JqsError::Corrupt(CorruptFileError::MarkOutOfBounds { pos: 5, len: 2 })
        ));

        let err = read_payload(&with_header("Q\u{1F}h\u{1F}e\u{1F}9\u{1F}")).unwrap_err();
        assert!(matches!(
            err,
            JqsError::Corrupt(CorruptFileError::UnknownQuestionType(ref code)) if code == "9"
        ));
    }

    #[test]
    fn extra_pixels_are_dropped_missing_ones_are_not() {
        assert_eq!(read_pixels("1,2,3,", 1, 2, 0).unwrap(), vec![1, 2]);
        assert_eq!(read_pixels("\u{06}", 0, 4, 0).unwrap(), Vec::<i32>::new());
        assert_eq!(
            read_pixels("1,", 2, 1, 3),
            Err(CorruptFileError::PixelCount {
                pos: 3,
                expected: 2,
                found: 1
            })
        );
        assert!(read_pixels("1,x,", 2, 1, 0).is_err());
    }
}
