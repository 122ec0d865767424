use colored::Colorize;
use env_logger::Env;
use jquestions::libjqs::codec;
use jquestions::libjqs::question::{answer_label, Question, QuestionType, MAX_ANSWERS};
use jquestions::QuestionPool;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "jqs-convert")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a .jqs pool from JSON.
    Import {
        json: PathBuf,
        jqs: PathBuf,
        /// Add the questions to an existing pool, keeping its configuration.
        #[arg(short, long)]
        append: bool,
        /// Only write questions flagged `marked` in the JSON.
        #[arg(short, long)]
        marked_only: bool,
    },
    /// Dump a .jqs pool as JSON, to stdout when no file is given.
    Export { jqs: PathBuf, json: Option<PathBuf> },
    /// Summarise a .jqs pool.
    Info { jqs: PathBuf },
    /// Write every embedded image as a PNG.
    #[cfg(feature = "images")]
    Images { jqs: PathBuf, out_dir: PathBuf },
}

fn fail(message: String) -> ! {
    error!("{}", message.red());
    std::process::exit(1);
}

fn load_or_exit(path: &Path) -> QuestionPool {
    match codec::load(path) {
        Ok(pool) => pool,
        Err(e) => fail(format!("Unable to open {:?}: {}", path, e)),
    }
}

/// Why `question` cannot be stored, if anything.
fn validate(question: &Question) -> Result<(), String> {
    let answers = question.possible_answers.len();
    if answers > MAX_ANSWERS {
        return Err(format!("{} answers, at most {} allowed", answers, MAX_ANSWERS));
    }
    if let Some(idx) = question.correct_answers.iter().find(|&&idx| idx >= answers) {
        return Err(format!(
            "correct answer {} but only {} answers",
            idx, answers
        ));
    }
    if question.question_type == QuestionType::DragNDrop
        && question.correct_answers.len() != question.content.field_count()
    {
        warn!(
            "[Import] {:?} has {} fields but {} correct answers.",
            question.text,
            question.content.field_count(),
            question.correct_answers.len()
        );
    }
    Ok(())
}

fn import(json: PathBuf, jqs: PathBuf, append: bool, marked_only: bool) {
    let raw = match std::fs::read_to_string(&json) {
        Ok(raw) => raw,
        Err(e) => fail(format!("Unable to read {:?}: {}", json, e)),
    };
    let mut incoming: QuestionPool = match serde_json::from_str(raw.as_str()) {
        Ok(pool) => pool,
        Err(e) => fail(format!("Malformed JSON: {}!", e)),
    };
    info!(
        "{}",
        format!("Importing data... ({} Questions)", incoming.len()).blue()
    );

    incoming.questions.retain(|question| match validate(question) {
        Ok(()) => {
            info!("{}", format!("├ Question: {}", question.text).blue());
            true
        }
        Err(reason) => {
            error!(
                "{}",
                format!("├ Question: {} ({})", question.text, reason)
                    .red()
                    .strikethrough()
            );
            false
        }
    });

    let pool = if append && jqs.exists() {
        let mut existing = load_or_exit(&jqs);
        existing.append(incoming);
        existing
    } else {
        incoming
    };

    match codec::save(&pool, &jqs, marked_only) {
        Ok(()) => info!(
            "{}",
            format!("Wrote {} questions to {:?}.", pool.len(), jqs).green()
        ),
        Err(e) => fail(format!("Unable to write {:?}: {}", jqs, e)),
    }
}

fn export(jqs: PathBuf, json: Option<PathBuf>) {
    let pool = load_or_exit(&jqs);
    let out = match serde_json::to_string_pretty(&pool) {
        Ok(out) => out,
        Err(e) => fail(format!("Unable to serialize pool: {}", e)),
    };
    match json {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, out) {
                fail(format!("Unable to write {:?}: {}", path, e));
            }
            info!(
                "{}",
                format!("Exported {} questions to {:?}.", pool.len(), path).green()
            );
        }
        None => println!("{}", out),
    }
}

fn summary(jqs: PathBuf) {
    let pool = load_or_exit(&jqs);
    println!("{}", pool.description.cyan().bold());
    println!(
        "├ {} questions, {} asked per quiz, {} marked",
        pool.len(),
        pool.effective_question_count(),
        pool.marked_count()
    );
    println!(
        "├ exam: {}, timed: {}, changes allowed: {}",
        pool.is_exam,
        if pool.timed {
            format!("{} min", pool.time_limit_minutes)
        } else {
            "no".to_string()
        },
        pool.change_allowed
    );
    for (i, question) in pool.iter().enumerate() {
        let kind = match question.question_type {
            QuestionType::MultiChoice => "multi-choice",
            QuestionType::DragNDrop => "drag-and-drop",
        };
        let correct: Vec<String> = question
            .correct_answers
            .iter()
            .map(|&idx| answer_label(idx))
            .collect();
        println!(
            "├ {}. {} ({}, {} answers, correct: {}, {} images, {} fields)",
            i + 1,
            question.text,
            kind,
            question.possible_answers.len(),
            correct.join(" "),
            question.content.images().count(),
            question.content.field_count()
        );
    }
}

#[cfg(feature = "images")]
fn images(jqs: PathBuf, out_dir: PathBuf) {
    let pool = load_or_exit(&jqs);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        fail(format!("Unable to create {:?}: {}", out_dir, e));
    }
    let mut written = 0;
    for (i, question) in pool.iter().enumerate() {
        for (pos, image) in question.content.images() {
            let path = out_dir.join(format!("q{}_{}.png", i + 1, pos));
            match image.to_rgba().save(&path) {
                Ok(()) => {
                    info!("{}", format!("├ {:?}", path).blue());
                    written += 1;
                }
                Err(e) => error!("{}", format!("├ {:?}: {}", path, e).red()),
            }
        }
    }
    info!("{}", format!("Wrote {} images.", written).green());
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    match args.command {
        Commands::Import {
            json,
            jqs,
            append,
            marked_only,
        } => import(json, jqs, append, marked_only),
        Commands::Export { jqs, json } => export(jqs, json),
        Commands::Info { jqs } => summary(jqs),
        #[cfg(feature = "images")]
        Commands::Images { jqs, out_dir } => images(jqs, out_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jquestions::PossibleAnswer;

    #[test]
    fn rejects_out_of_range_correct_answers() {
        let mut q = Question::new(QuestionType::MultiChoice);
        q.possible_answers = vec![PossibleAnswer::new("yes"), PossibleAnswer::new("no")];
        q.correct_answers = vec![1];
        assert!(validate(&q).is_ok());
        q.correct_answers = vec![2];
        assert!(validate(&q).is_err());
    }

    #[test]
    fn json_without_configuration_gets_defaults() {
        let pool: QuestionPool = serde_json::from_str(
            r#"{ "questions": [ {
                "text": "Capital of France?",
                "question_type": "multi_choice",
                "possible_answers": [ { "text": "Paris" }, { "text": "Rome" } ],
                "correct_answers": [0]
            } ] }"#,
        )
        .unwrap();
        assert_eq!(pool.description, QuestionPool::default().description);
        assert_eq!(pool.questions[0].possible_answers[1].text, "Rome");
        assert!(validate(&pool.questions[0]).is_ok());
    }
}
