use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::model::{Phase, Tier};
use services::{QuizRuntime, QuizSession, RuntimeError, Snapshot, DEFAULT_REVEAL_TICKS};
use source::JsonFileSource;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidRevealTicks { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidRevealTicks { raw } => {
                write!(f, "invalid --reveal-ticks value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    bank_dir: String,
    bank: String,
    reveal_ticks: u32,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--dir <bank_dir>] [--bank <name>] [--reveal-ticks <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --dir assets");
    eprintln!("  --bank questions_en   (questions_es ships alongside)");
    eprintln!("  --reveal-ticks 2");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_DIR, QUIZ_BANK");
}

fn print_commands() {
    println!("Commands:");
    println!("  start          begin the quiz");
    println!("  <number>       select a choice");
    println!("  ok             confirm the selection");
    println!("  next           skip the reveal delay");
    println!("  load <bank>    switch question bank (e.g. load questions_es)");
    println!("  reset          discard the session");
    println!("  quit");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut bank_dir = std::env::var("QUIZ_BANK_DIR").unwrap_or_else(|_| "assets".into());
        let mut bank = std::env::var("QUIZ_BANK").unwrap_or_else(|_| "questions_en".into());
        let mut reveal_ticks = DEFAULT_REVEAL_TICKS;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dir" => bank_dir = require_value(args, "--dir")?,
                "--bank" => bank = require_value(args, "--bank")?,
                "--reveal-ticks" => {
                    let value = require_value(args, "--reveal-ticks")?;
                    reveal_ticks = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidRevealTicks { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            bank_dir,
            bank,
            reveal_ticks,
        })
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn result_message(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => "Excellent! You have mastered this topic.",
        Tier::Good => "Good job! You know this topic well.",
        Tier::Fair => "Not bad. Keep practicing to improve.",
        Tier::NeedsWork => "Keep at it! Review the material and try again.",
    }
}

fn render(snapshot: &Snapshot) {
    match snapshot.phase {
        Phase::Idle => println!("No quiz loaded. Use 'load <bank>'."),
        Phase::Loading => println!("Loading questions..."),
        Phase::Ready => println!(
            "Loaded {} questions. Type 'start' to begin, 'help' for commands.",
            snapshot.total
        ),
        Phase::InProgress | Phase::AnswerRevealed => render_question(snapshot),
        Phase::Finished => render_result(snapshot),
        Phase::Error => {
            if let Some(reason) = &snapshot.error {
                println!("Could not load questions: {reason}");
            }
            println!("Use 'load <bank>' to retry.");
        }
    }
}

fn render_question(snapshot: &Snapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };

    println!();
    println!(
        "Question {}/{}  score {}  [{}]",
        snapshot.current_index + 1,
        snapshot.total,
        snapshot.score,
        format_elapsed(snapshot.elapsed_seconds)
    );
    println!("{}", question.wording);
    for (i, choice) in question.choices.iter().enumerate() {
        let marker = match choice.correct {
            Some(true) => "+",
            Some(false) if question.selected == Some(i) => "x",
            _ if question.selected == Some(i) => ">",
            _ => " ",
        };
        println!("  {marker} {}. {}", i + 1, choice.text);
    }
    if snapshot.phase == Phase::InProgress && question.selected.is_none() {
        println!("(type a number to select, then 'ok' to confirm)");
    }
}

fn render_result(snapshot: &Snapshot) {
    println!();
    println!("Final score: {}/{}", snapshot.score, snapshot.total);
    println!("Time: {}", format_elapsed(snapshot.elapsed_seconds));
    if let Some(tier) = snapshot.tier {
        println!("{}", result_message(tier));
    }
    println!("(type 'load <bank>' to play again, 'quit' to exit)");
}

//
// ─── MAIN LOOP ─────────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let bank_source = Arc::new(JsonFileSource::new(&args.bank_dir));
    let session = QuizSession::new().with_reveal_ticks(args.reveal_ticks);
    let handle = QuizRuntime::new(bank_source, session).spawn();

    // render every visible state change in the background
    let mut rx = handle.snapshots();
    tokio::spawn(async move {
        let mut last_key = None;
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let key = (
                snapshot.phase,
                snapshot.current_index,
                snapshot.question.as_ref().and_then(|q| q.selected),
            );
            // ticks alone do not warrant a reprint
            if last_key != Some(key) {
                render(&snapshot);
                last_key = Some(key);
            }
        }
    });

    handle.load(&args.bank).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let outcome = match line {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "s" | "start" => handle.start().await,
            "ok" | "confirm" => handle.confirm().await,
            "n" | "next" => handle.advance().await,
            "reset" => handle.reset().await,
            "h" | "help" => {
                print_commands();
                continue;
            }
            other => {
                if let Some(bank) = other.strip_prefix("load ") {
                    handle.load(bank.trim()).await
                } else if let Ok(number) = other.parse::<usize>() {
                    if number == 0 {
                        println!("choices are numbered from 1");
                        continue;
                    }
                    handle.select(number - 1).await
                } else {
                    println!("unknown command: {other} (try 'help')");
                    continue;
                }
            }
        };

        match outcome {
            Ok(()) => {}
            Err(RuntimeError::Closed) => break,
            Err(err) => println!("! {err}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
