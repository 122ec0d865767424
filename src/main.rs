use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use jquestions::libjqs::codec::{self, BUILTIN, DEMO_POOL};
use jquestions::libjqs::session::QuizSession;
use jquestions::JqsError;
use log::{debug, warn};
use std::path::PathBuf;
use thiserror::Error;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "JQuestions")]
#[command(version, about, long_about = None)]
struct Args {
    /// Question pool to take. The bundled demo pool is used when omitted.
    #[arg(value_name = "FILE")]
    pool: Option<PathBuf>,
    /// Ask this many questions (0 for all), if the pool allows changes.
    #[arg(short, long)]
    question_count: Option<u32>,
    /// Exam mode: no feedback until the end, if the pool allows changes.
    #[arg(short, long)]
    exam: Option<bool>,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Error)]
enum Error {
    #[error("cannot load question pool: {0}")]
    Load(#[from] JqsError),
    #[error("no questions!")]
    NoQuestions,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let loaded = match &args.pool {
        Some(path) => codec::load(path),
        None => codec::load_resource(DEMO_POOL, &BUILTIN),
    };
    let mut pool = match loaded {
        Ok(pool) => pool,
        Err(JqsError::FileTooNew { found, supported }) => {
            println!(
                "{}",
                format!(
                    "This pool uses file format {found}, but this JQuestions only reads up to {supported}. Please upgrade."
                )
                .bright_red()
            );
            return Err(Error::Load(JqsError::FileTooNew { found, supported }));
        }
        Err(err) => {
            println!("{}", format!("Could not open the question pool: {err}").bright_red());
            return Err(err.into());
        }
    };
    debug!("[Setup] Loaded pool {:?}", pool.description);

    if args.question_count.is_some() || args.exam.is_some() {
        if pool.change_allowed {
            if let Some(count) = args.question_count {
                pool.number_of_questions = count;
            }
            if let Some(exam) = args.exam {
                pool.is_exam = exam;
            }
        } else {
            warn!("[Setup] Pool does not allow configuration changes; ignoring overrides.");
            println!(
                "{}",
                "This pool does not allow changing its configuration.".yellow()
            );
        }
    }

    if pool.is_empty() {
        println!(
            "{}",
            "This pool has no questions. Import some with jqs-convert first!".yellow()
        );
        return Err(Error::NoQuestions);
    }

    let mut session = QuizSession::start(pool);
    println!(
        "{}",
        format!(
            "==========> {} ({} questions) <==========",
            session.pool().description,
            session.len()
        )
        .cyan()
    );

    cli::cli_loop(&mut session);
    cli::print_report(&session);
    Ok(())
}
