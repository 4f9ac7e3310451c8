use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncBufReadExt;

use quiz_core::{AttemptSummary, Clock, Difficulty, Identity, Question, level_progress};
use services::{
    HttpQuestionSource, HttpScoreSink, NullScoreSink, QuestionSource, QuizApiConfig, ScoreSink,
    SessionError, SessionRunner, SessionStatus, StaticQuestionSource,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDifficulty { raw: String },
    MissingTopic,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDifficulty { raw } => write!(f, "invalid --difficulty value: {raw}"),
            ArgsError::MissingTopic => write!(f, "--topic is required"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --topic <topic> [--difficulty easy|medium|hard]");
    eprintln!("                      [--base-url <url>] [--offline]");
    eprintln!("                      [--user <id>] [--name <username>] [--email <email>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --difficulty easy");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_USER_ID, QUIZ_USERNAME, QUIZ_EMAIL, QUIZ_TOTAL_XP");
}

struct Args {
    topic: String,
    difficulty: Difficulty,
    base_url: Option<String>,
    offline: bool,
    identity: Option<Identity>,
    total_xp: i64,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut topic: Option<String> = None;
        let mut difficulty = Difficulty::Easy;
        let mut base_url: Option<String> = None;
        let mut offline = false;
        let mut user_id = std::env::var("QUIZ_USER_ID").ok();
        let mut username = std::env::var("QUIZ_USERNAME").ok();
        let mut email = std::env::var("QUIZ_EMAIL").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topic" => topic = Some(require_value(args, "--topic")?),
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value })?;
                }
                "--base-url" => base_url = Some(require_value(args, "--base-url")?),
                "--offline" => offline = true,
                "--user" => user_id = Some(require_value(args, "--user")?),
                "--name" => username = Some(require_value(args, "--name")?),
                "--email" => email = Some(require_value(args, "--email")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let topic = topic
            .filter(|t| !t.trim().is_empty())
            .ok_or(ArgsError::MissingTopic)?;

        // Without a user id this is a guest session: scored locally, never
        // reported to the backend.
        let identity = user_id.map(|user_id| {
            Identity::new(
                user_id,
                username.unwrap_or_else(|| "Anonymous".to_owned()),
                email,
            )
        });

        let total_xp = std::env::var("QUIZ_TOTAL_XP")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0);

        Ok(Self {
            topic,
            difficulty,
            base_url,
            offline,
            identity,
            total_xp,
        })
    }
}

/// Built-in question set for `--offline` runs.
fn sample_questions() -> Vec<Question> {
    let units = vec![
        "Joule".to_owned(),
        "Pascal".to_owned(),
        "Newton".to_owned(),
        "Watt".to_owned(),
    ];
    vec![
        Question::new(
            0,
            "Physics",
            "What unit measures force?",
            units.clone(),
            "C",
        )
        .expect("sample question should validate"),
        Question::new(
            1,
            "Physics",
            "What unit measures pressure?",
            units,
            "Pascal",
        )
        .expect("sample question should validate"),
        Question::new(
            2,
            "Mathematics",
            "What is 12 x 12?",
            vec!["121".to_owned(), "144".to_owned(), "146".to_owned()],
            "144",
        )
        .expect("sample question should validate"),
    ]
}

/// Map a bare letter to its option text; anything else passes through raw.
fn resolve_answer(input: &str, question: &Question) -> String {
    let index = match input.to_ascii_lowercase().as_str() {
        "a" => Some(0),
        "b" => Some(1),
        "c" => Some(2),
        "d" => Some(3),
        _ => None,
    };
    index
        .and_then(|i| question.options().get(i))
        .cloned()
        .unwrap_or_else(|| input.to_owned())
}

fn show_question(runner: &SessionRunner) -> Result<bool, SessionError> {
    let progress = runner.progress()?;
    let Some(question) = runner.current_question()? else {
        return Ok(false);
    };

    println!();
    println!(
        "[{}] Question {} of {} - {}s left",
        question.topic(),
        progress.current + 1,
        progress.total,
        progress.remaining_seconds
    );
    println!("{}", question.prompt());
    for (letter, option) in ["A", "B", "C", "D"].iter().zip(question.options()) {
        println!("  {letter}) {option}");
    }
    println!("Answer with a letter or the option text, or: skip, back, submit, quit");
    Ok(true)
}

/// Run the interactive loop until the session submits (manually or by
/// timeout) or the user walks away.
async fn drive_quiz(
    runner: &SessionRunner,
) -> Result<Option<AttemptSummary>, Box<dyn std::error::Error>> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(250));

    loop {
        if runner.status()? == SessionStatus::Submitted {
            return Ok(None);
        }
        if !show_question(runner)? {
            return Ok(None);
        }

        // Wait for input while watching for the countdown to expire.
        let line = loop {
            tokio::select! {
                line = lines.next_line() => break line?,
                _ = poll.tick() => {
                    if runner.status()? == SessionStatus::Submitted {
                        println!();
                        println!("Time is up!");
                        return Ok(None);
                    }
                }
            }
        };
        let Some(line) = line else {
            // stdin closed; submit whatever has been answered so far.
            return finish(runner);
        };

        let progress = runner.progress()?;
        let at_last = progress.current + 1 == progress.total;

        match line.trim().to_ascii_lowercase().as_str() {
            "" => {}
            "quit" => {
                println!("Session discarded.");
                std::process::exit(0);
            }
            "back" | "previous" => {
                runner.previous_question()?;
            }
            "skip" | "next" => {
                if at_last {
                    return finish(runner);
                }
                runner.next_question()?;
            }
            "submit" => return finish(runner),
            answer => {
                let Some(question) = runner.current_question()? else {
                    return Ok(None);
                };
                let resolved = resolve_answer(answer, &question);
                match runner.select_answer(progress.current, resolved) {
                    Ok(()) => {
                        if at_last {
                            return finish(runner);
                        }
                        runner.next_question()?;
                    }
                    // The countdown beat us to it mid-keystroke.
                    Err(SessionError::AlreadySubmitted) => return Ok(None),
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
}

fn finish(runner: &SessionRunner) -> Result<Option<AttemptSummary>, Box<dyn std::error::Error>> {
    match runner.submit() {
        Ok(summary) => Ok(Some(summary)),
        Err(SessionError::AlreadySubmitted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn print_result(
    runner: &SessionRunner,
    summary: Option<&AttemptSummary>,
    total_xp: i64,
) -> Result<(), SessionError> {
    let score = match summary {
        Some(summary) => summary.score,
        None => runner.final_score()?.unwrap_or(0),
    };

    println!();
    println!("Quiz complete! You earned {score} XP.");
    if let Some(summary) = summary {
        for record in &summary.records {
            let mark = if record.is_correct { "+" } else { "-" };
            println!("  {mark} {} (you: {})", record.prompt, record.user_answer);
        }
        println!(
            "{} correct, {} skipped",
            summary.correct_count(),
            summary.skipped_count()
        );
    }

    let progress = level_progress(total_xp.saturating_add(i64::from(score)));
    println!(
        "Level {} - {}/{} XP into the level ({:.1}%)",
        progress.level, progress.current_level_xp, progress.required_xp, progress.percent
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let (source, sink): (Arc<dyn QuestionSource>, Arc<dyn ScoreSink>) = if args.offline {
        (
            Arc::new(StaticQuestionSource::new(sample_questions())),
            Arc::new(NullScoreSink),
        )
    } else {
        let config = args
            .base_url
            .clone()
            .map_or_else(QuizApiConfig::from_env, QuizApiConfig::new);
        (
            Arc::new(HttpQuestionSource::new(config.clone())),
            Arc::new(HttpScoreSink::new(config)),
        )
    };

    if args.identity.is_none() {
        println!("No user id given; playing as guest (score stays local).");
    }

    let mut runner = SessionRunner::new(
        args.topic.clone(),
        args.difficulty,
        args.identity.clone(),
        source,
        sink,
        Clock::system(),
    )?;

    println!(
        "Preparing a {} quiz on \"{}\"...",
        args.difficulty, args.topic
    );
    runner.start().await?;
    let progress = runner.progress()?;
    log::debug!(
        "session started: {} questions, {}s budget",
        progress.total,
        progress.remaining_seconds
    );

    let summary = drive_quiz(&runner).await?;
    print_result(&runner, summary.as_ref(), args.total_xp)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
