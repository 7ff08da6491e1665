use std::fmt;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use fraction_core::model::LessonKind;
use services::{
    Clock, DEFAULT_EXPLAIN_TIMEOUT, Explanation, InputField, LessonLoopService, LessonSession,
    LessonView, OfflineTutor, Phase, RemoteTutor, SessionError, StepOutcome, TutorFeedbackService,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::info;

mod render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout-secs value: {raw}"),
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
    eprintln!("  cargo run -p app -- [naming|value] [--seed <u64>] [--offline]");
    eprintln!("                      [--timeout-secs <n>] [-v]");
    eprintln!();
    eprintln!("Without a lesson the drill opens the lesson menu.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FRACTION_TUTOR_API_KEY, FRACTION_TUTOR_BASE_URL, FRACTION_TUTOR_MODEL");
    eprintln!("  FRACTION_TUTOR_TIMEOUT_SECS, FRACTION_SEED, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    lesson: Option<LessonKind>,
    seed: Option<u64>,
    offline: bool,
    tutor_timeout: Duration,
    verbose: bool,
}

fn lesson_from_arg(arg: &str) -> Option<LessonKind> {
    match arg {
        "naming" => Some(LessonKind::Naming),
        "value" => Some(LessonKind::ValueFinding),
        _ => None,
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            lesson: None,
            seed: std::env::var("FRACTION_SEED")
                .ok()
                .and_then(|value| value.trim().parse::<u64>().ok()),
            offline: false,
            tutor_timeout: std::env::var("FRACTION_TUTOR_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map_or(DEFAULT_EXPLAIN_TIMEOUT, Duration::from_secs),
            verbose: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let seed = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    parsed.seed = Some(seed);
                }
                "--timeout-secs" => {
                    let value = require_value(args, "--timeout-secs")?;
                    let secs: u64 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidTimeout { raw: value.clone() })?;
                    parsed.tutor_timeout = Duration::from_secs(secs);
                }
                "--offline" => parsed.offline = true,
                "-v" | "--verbose" => parsed.verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => match lesson_from_arg(other) {
                    Some(kind) if parsed.lesson.is_none() => parsed.lesson = Some(kind),
                    _ => return Err(ArgsError::UnknownArg(arg)),
                },
            }
        }

        Ok(parsed)
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // stdout belongs to the drill.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn build_tutor(offline: bool) -> Arc<dyn TutorFeedbackService> {
    if offline {
        return Arc::new(OfflineTutor);
    }
    let remote = RemoteTutor::from_env();
    if remote.enabled() {
        Arc::new(remote)
    } else {
        info!("FRACTION_TUTOR_API_KEY not set, using the offline tutor");
        Arc::new(OfflineTutor)
    }
}

type Input = Lines<BufReader<Stdin>>;

enum Exit {
    Menu,
    Quit,
}

fn show(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{text}")?;
    stdout.flush()
}

async fn menu(svc: &LessonLoopService, input: &mut Input) -> std::io::Result<Option<LessonKind>> {
    println!();
    println!("{}", svc.greeting().await);
    println!("  1) {}", render::title(LessonKind::Naming));
    println!("  2) {}", render::title(LessonKind::ValueFinding));
    println!("  q) quit");
    loop {
        show("Choose a lesson > ")?;
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        match line.trim() {
            "1" | "naming" => return Ok(Some(LessonKind::Naming)),
            "2" | "value" => return Ok(Some(LessonKind::ValueFinding)),
            "q" | "quit" => return Ok(None),
            _ => println!("Type 1, 2 or q."),
        }
    }
}

/// Turn one learner line into a submission for the current phase.
fn submit_line(
    svc: &LessonLoopService,
    session: &mut LessonSession,
    line: &str,
) -> Result<StepOutcome, String> {
    let fail = |err: SessionError| match err {
        // Already on screen as the tutor message.
        SessionError::Malformed { .. } => String::new(),
        other => other.to_string(),
    };
    match session.phase() {
        Phase::RulerPartition => {
            let tick = line
                .parse::<u32>()
                .map_err(|_| "Type a cm mark as a number.".to_string())?;
            svc.on_ruler_pick(session, tick).map_err(fail)
        }
        Phase::SegmentColoring => match line.parse::<u32>() {
            Ok(number) if number >= 1 => svc.on_segment_pick(session, number - 1).map_err(fail),
            _ => Err("Type the number of a segment, starting at 1.".to_string()),
        },
        Phase::Resolved { outcome: true } => {
            Err("This one is solved. Type 'next' or 'menu'.".to_string())
        }
        _ => {
            let enabled = session.enabled_fields();
            if enabled.contains(&InputField::Numerator) {
                let (numerator, denominator) = line
                    .split_once('/')
                    .ok_or_else(|| "Type the fraction like 2/3.".to_string())?;
                session
                    .update_input(InputField::Numerator, numerator)
                    .map_err(fail)?;
                session
                    .update_input(InputField::Denominator, denominator)
                    .map_err(fail)?;
            } else if let Some(field) = enabled.iter().copied().find(InputField::is_typed) {
                session.update_input(field, line).map_err(fail)?;
            }
            svc.check(session).map_err(fail)
        }
    }
}

fn request_explanation(
    svc: &Arc<LessonLoopService>,
    session: &LessonSession,
    tx: &mpsc::UnboundedSender<Explanation>,
) {
    let Some(request) = svc.explanation_request(session) else {
        return;
    };
    let svc = Arc::clone(svc);
    let tx = tx.clone();
    tokio::spawn(async move {
        let explanation = svc.explain(request).await;
        // The lesson may have been left already.
        let _ = tx.send(explanation);
    });
}

async fn lesson(
    svc: &Arc<LessonLoopService>,
    kind: LessonKind,
    input: &mut Input,
) -> std::io::Result<Exit> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Explanation>();
    let mut session = svc.start_lesson(kind);
    show(&render::lesson(&LessonView::from_session(&session)))?;

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    return Ok(Exit::Quit);
                };
                let line = line.trim();
                match line {
                    "" => {}
                    "q" | "quit" => return Ok(Exit::Quit),
                    "menu" => return Ok(Exit::Menu),
                    "next" => session = svc.next_problem(session),
                    "help" => println!("Answer the question, or type next, menu or quit."),
                    _ => match submit_line(svc, &mut session, line) {
                        Ok(StepOutcome::Graded { .. }) => {
                            request_explanation(svc, &session, &tx);
                        }
                        Ok(_) => {}
                        Err(message) if message.is_empty() => {}
                        Err(message) => println!("{message}"),
                    },
                }
                println!();
                show(&render::lesson(&LessonView::from_session(&session)))?;
            }
            Some(explanation) = rx.recv() => {
                if session.apply_explanation(&explanation) {
                    println!();
                    println!("Tutor: {}", explanation.text);
                    show("> ")?;
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(args.verbose);

    let mut svc = LessonLoopService::new(Clock::default(), build_tutor(args.offline))
        .with_tutor_timeout(args.tutor_timeout);
    if let Some(seed) = args.seed {
        svc = svc.with_seed(seed);
    }
    let svc = Arc::new(svc);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let mut pending = args.lesson;
    loop {
        let kind = match pending.take() {
            Some(kind) => kind,
            None => match menu(&svc, &mut input).await? {
                Some(kind) => kind,
                None => break,
            },
        };
        match lesson(&svc, kind, &mut input).await? {
            Exit::Menu => {}
            Exit::Quit => break,
        }
    }

    println!("Bye!");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
