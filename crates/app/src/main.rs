use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::TestId;
use services::{Clock, QuizWorkflowService};
use storage::{FsTestRepository, HttpTestRepository, TestRepository};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTestId { raw: String },
    InvalidSeed { raw: String },
    ConflictingSources,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTestId { raw } => write!(f, "invalid --test value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::ConflictingSources => {
                write!(f, "--tests-dir and --remote cannot be used together")
            }
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

/// Where test documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Dir(PathBuf),
    Remote(String),
}

#[derive(Debug)]
struct Args {
    source: Source,
    test: Option<TestId>,
    seed: Option<u64>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--tests-dir <dir> | --remote <url>] [--test <id>] [--seed <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --tests-dir .            (tests are read from <dir>/tests/<id>/test.json)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_TESTS_DIR, QUIZ_REMOTE_URL, QUIZ_TEST, QUIZ_SEED, RUST_LOG");
}

fn parse_test_id(raw: String) -> Result<TestId, ArgsError> {
    TestId::new(raw.clone()).map_err(|_| ArgsError::InvalidTestId { raw })
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeed { raw })
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let env = |key: &str| std::env::var(key).ok().filter(|value| !value.trim().is_empty());

        let mut tests_dir = env("QUIZ_TESTS_DIR").map(PathBuf::from);
        let mut remote = env("QUIZ_REMOTE_URL");
        let mut test = env("QUIZ_TEST").map(parse_test_id).transpose()?;
        let mut seed = env("QUIZ_SEED").map(parse_seed).transpose()?;
        let mut dir_flag = false;
        let mut remote_flag = false;

        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tests-dir" => {
                    tests_dir = Some(PathBuf::from(require_value(&mut args, "--tests-dir")?));
                    dir_flag = true;
                }
                "--remote" => {
                    remote = Some(require_value(&mut args, "--remote")?);
                    remote_flag = true;
                }
                "--test" => test = Some(parse_test_id(require_value(&mut args, "--test")?)?),
                "--seed" => seed = Some(parse_seed(require_value(&mut args, "--seed")?)?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if dir_flag && remote_flag {
            return Err(ArgsError::ConflictingSources);
        }
        // A flag beats the other source's environment variable.
        let source = match (tests_dir, remote) {
            (Some(dir), Some(_)) if dir_flag => Source::Dir(dir),
            (_, Some(url)) => Source::Remote(url),
            (Some(dir), None) => Source::Dir(dir),
            (None, None) => Source::Dir(PathBuf::from(".")),
        };

        Ok(Self { source, test, seed })
    }
}

struct DesktopApp {
    launch_test: Option<TestId>,
    workflow: Arc<QuizWorkflowService>,
}

impl UiApp for DesktopApp {
    fn launch_test(&self) -> Option<String> {
        self.launch_test.as_ref().map(|id| id.as_str().to_owned())
    }

    fn workflow(&self) -> Arc<QuizWorkflowService> {
        Arc::clone(&self.workflow)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_repository(source: &Source) -> Result<Arc<dyn TestRepository>, Box<dyn std::error::Error>> {
    Ok(match source {
        Source::Dir(dir) => Arc::new(FsTestRepository::new(dir)),
        Source::Remote(url) => Arc::new(HttpTestRepository::new(url)?),
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    tracing::info!(source = ?args.source, test = ?args.test, seed = ?args.seed, "starting quiz");

    let tests = build_repository(&args.source)?;
    let workflow = QuizWorkflowService::new(Clock::default_clock(), tests).with_seed(args.seed);

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        launch_test: args.test,
        workflow: Arc::new(workflow),
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Quiz")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
