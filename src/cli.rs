use colored::Colorize;
use jquestions::libjqs::content::{Mark, RichContent, PLACEHOLDER};
use jquestions::libjqs::question::{answer_label, parse_answer_label, Question, QuestionType};
use jquestions::libjqs::session::{QuizSession, Response};
use log::debug;
use std::time::{Duration, Instant};
use text_io::read;

#[derive(Debug, PartialEq)]
enum Choice {
    Answer(Response),
    Hint,
    DontKnow,
    Quit,
}

impl Choice {
    /// `quit` quits, `?` asks for the hint, otherwise answer labels separated by
    /// spaces or commas. For drag-and-drop questions the labels fill the
    /// fields in order.
    fn from_str(question: &Question, input: &str) -> Choice {
        match input.trim() {
            quit if quit.eq_ignore_ascii_case("quit") => Choice::Quit,
            "?" => Choice::Hint,
            "" => Choice::DontKnow,
            input => {
                let picked: Option<Vec<usize>> = input
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|label| !label.is_empty())
                    .map(parse_answer_label)
                    .collect();
                let answers = question.possible_answers.len();
                match picked {
                    Some(picked) if picked.iter().all(|&idx| idx < answers) => {
                        Choice::Answer(match question.question_type {
                            QuestionType::MultiChoice => Response::Choices(
                                (0..answers).map(|idx| picked.contains(&idx)).collect(),
                            ),
                            QuestionType::DragNDrop => Response::Fields(
                                picked
                                    .iter()
                                    .map(|&idx| question.possible_answers[idx].text.clone())
                                    .collect(),
                            ),
                        })
                    }
                    _ => {
                        println!(
                            "{}",
                            format!("There are only {} options available!", answers).bright_red()
                        );
                        Choice::DontKnow
                    }
                }
            }
        }
    }
}

/// The question body with images and fields spelled out.
fn render_content(content: &RichContent) -> String {
    let mut out = String::new();
    let mut field = 0;
    for (pos, c) in content.text().chars().enumerate() {
        match content.mark_at(pos) {
            Some(Mark::Image(image)) => {
                out.push_str(&format!("[image {}x{}]", image.width, image.height))
            }
            Some(Mark::Field(_)) => {
                field += 1;
                out.push_str(&format!("[ {} ]", field).bold().to_string());
            }
            None if c == PLACEHOLDER => out.push(' '),
            None => out.push(c),
        }
    }
    out
}

/// The hint to show for `?`, if any. Exams give no hints.
fn hint_for(question: &Question, is_exam: bool) -> Option<&str> {
    if is_exam || question.hint_text.is_empty() {
        None
    } else {
        Some(question.hint_text.as_str())
    }
}

/// Explanation lines shown after a wrong answer. Multi-choice questions list
/// the correct labels, the question's explanation, then a verdict for every
/// answer; drag-and-drop questions only have the question's explanation.
fn explain(question: &Question) -> Vec<String> {
    const NOTHING_MORE: &str = "No further explanation available.";
    let mut lines = Vec::new();
    match question.question_type {
        QuestionType::MultiChoice => {
            let mut correct = question.correct_answers.clone();
            correct.sort_unstable();
            let labels: Vec<String> = correct.iter().map(|&idx| answer_label(idx)).collect();
            lines.push(format!("Correct: {}", labels.join(" ")));
            if !question.explain_text.is_empty() {
                lines.push(question.explain_text.clone());
            }
            if question
                .possible_answers
                .iter()
                .all(|answer| answer.explanation.is_empty())
            {
                lines.push(NOTHING_MORE.to_string());
            } else {
                for (i, answer) in question.possible_answers.iter().enumerate() {
                    let verdict = if question.is_correct_answer(i) {
                        "is correct"
                    } else {
                        "is incorrect"
                    };
                    lines.push(format!("{} {}: {}", answer_label(i), verdict, answer.explanation));
                }
            }
        }
        QuestionType::DragNDrop => {
            if question.explain_text.is_empty() {
                lines.push(NOTHING_MORE.to_string());
            } else {
                lines.push(question.explain_text.clone());
            }
        }
    }
    lines
}

fn time_is_up(started: Instant, limit: Option<Duration>) -> bool {
    limit.is_some_and(|limit| started.elapsed() > limit)
}

pub fn cli_loop(session: &mut QuizSession) {
    let started = Instant::now();
    let time_limit = session.time_limit();
    let is_exam = session.pool().is_exam;
    if let Some(limit) = time_limit {
        println!("{}", format!("Time limit: {} minutes.", limit.as_secs() / 60).cyan());
    }

    for idx in 1..session.len() + 1 {
        if time_is_up(started, time_limit) {
            println!("{}", "Time is up!".bright_red());
            return;
        }
        let Some(question) = session.current().cloned() else {
            break;
        };

        let leading = format!("{}/{}. ", idx, session.len());
        println!("{}{}", leading.cyan(), question.text.black().bold().on_white());
        let indent = " ".repeat(leading.len());
        if !question.content.is_empty() {
            println!("{}{}", indent, render_content(&question.content));
        }
        for (i, answer) in question.possible_answers.iter().enumerate() {
            println!("{}{}. {}", indent, answer_label(i).bold(), answer.text);
        }

        let prompt = match question.question_type {
            QuestionType::MultiChoice => "Answer (letters, ? for a hint, quit to stop):",
            QuestionType::DragNDrop => "Fill the fields in order (letters, ? for a hint, quit to stop):",
        };
        let choice = loop {
            print!("{} ", prompt.cyan());
            let choice_string: String = read!("{}\n");
            let choice = Choice::from_str(&question, choice_string.as_str());
            debug!("choice: {:?}", choice);
            if choice != Choice::Hint {
                break choice;
            }
            match hint_for(&question, is_exam) {
                Some(hint) => println!("{}", hint.yellow()),
                None if is_exam => println!("{}", "Hints are not available in exam mode.".yellow()),
                None => println!("{}", "No hint for this one.".yellow()),
            }
        };

        // Answers given after the deadline are not recorded.
        if time_is_up(started, time_limit) {
            println!("{}", "Time is up!".bright_red());
            return;
        }

        let correct = match choice {
            Choice::Answer(response) => session.answer(response).unwrap_or(false),
            Choice::DontKnow => {
                let blank = match question.question_type {
                    QuestionType::MultiChoice => Response::Choices(Vec::new()),
                    QuestionType::DragNDrop => Response::Fields(Vec::new()),
                };
                session.answer(blank).unwrap_or(false)
            }
            Choice::Hint => unreachable!("hints are handled above"),
            Choice::Quit => {
                println!("{}", "Quitting Early!".cyan());
                return;
            }
        };

        if !is_exam {
            if correct {
                println!("{}", "Correct!".bright_green());
            } else {
                println!("{}", "Incorrect!".bright_red());
                for line in explain(&question) {
                    println!("{}{}", indent, line.green());
                }
            }
        }

        session.advance();
    }
}

pub fn print_report(session: &QuizSession) {
    let report = session.report();
    println!("{}", "==========> Finished <==========".cyan());
    if !session.pool().display_final_score {
        return;
    }
    for (i, result) in report.results.iter().enumerate() {
        let mark = match result {
            Some(true) => "✔".bright_green(),
            Some(false) => "✘".bright_red(),
            None => "-".normal(),
        };
        println!("{:>3}. {}", i + 1, mark);
    }
    println!(
        "{}",
        format!(
            "Correct answers: {}/{}  Score: {}%",
            report.correct,
            report.asked,
            report.score_percent()
        )
        .bold()
    );
}
