use crate::libjqs::codec::index::to_file_index;
use crate::libjqs::codec::token::TokenWriter;
use crate::libjqs::codec::version::FILE_FORMAT_VERSION;
use crate::libjqs::content::RichContent;
use crate::libjqs::pool::QuestionPool;
use crate::libjqs::question::Question;
use log::debug;
use std::io::{self, Write};

/// Writes the uncompressed token stream for `pool` and returns how many
/// questions went into it.
pub(crate) fn write_payload<W: Write>(
    pool: &QuestionPool,
    out: &mut W,
    marked_only: bool,
) -> io::Result<usize> {
    let mut tokens = TokenWriter::new(out);

    tokens.number(FILE_FORMAT_VERSION)?;
    tokens.text("description", &pool.description)?;
    tokens.flag(pool.change_allowed)?;
    tokens.flag(pool.is_exam)?;
    tokens.flag(pool.timed)?;
    tokens.number(pool.time_limit_minutes)?;
    tokens.flag(pool.display_final_score)?;
    tokens.flag(pool.display_print_option)?;
    tokens.text("student name", &pool.student_name)?;
    tokens.number(pool.number_of_questions)?;

    let mut written = 0;
    for question in pool.iter().filter(|q| !marked_only || q.marked) {
        write_question(&mut tokens, question)?;
        written += 1;
    }
    debug!("[Codec] Wrote {} of {} questions.", written, pool.len());
    Ok(written)
}

fn write_question<W: Write>(tokens: &mut TokenWriter<W>, question: &Question) -> io::Result<()> {
    tokens.text("question text", &question.text)?;
    tokens.text("hint", &question.hint_text)?;
    tokens.text("explanation", &question.explain_text)?;
    tokens.number(question.question_type.code())?;

    tokens.number(question.possible_answers.len())?;
    for answer in &question.possible_answers {
        tokens.text("answer", &answer.text)?;
        tokens.text("answer explanation", &answer.explanation)?;
    }

    tokens.number(question.correct_answers.len())?;
    for &index in &question.correct_answers {
        tokens.number(to_file_index(index))?;
    }

    write_content(tokens, &question.content)
}

fn write_content<W: Write>(tokens: &mut TokenWriter<W>, content: &RichContent) -> io::Result<()> {
    tokens.text("content", &content.text())?;

    let images: Vec<_> = content.images().collect();
    tokens.number(images.len())?;
    for (pos, image) in images {
        tokens.number(image.width)?;
        tokens.number(image.height)?;
        tokens.number(pos)?;
        tokens.pixels(&image.pixels)?;
    }

    let fields: Vec<_> = content.fields().collect();
    tokens.number(fields.len())?;
    for (pos, field) in fields {
        tokens.number(pos)?;
        tokens.text("field", &field.text)?;
    }
    Ok(())
}
