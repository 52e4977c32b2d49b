use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{
    AnswerKey, QuestionId, QuestionRecord, TestDefinition, TestDefinitionRecord, TestId,
};
use storage::{FsTestRepository, TestRepository};

#[derive(Debug, Clone)]
struct Args {
    root: PathBuf,
    test_id: TestId,
    title: String,
    questions: u32,
    force: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTestId { raw: String },
    InvalidQuestions { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTestId { raw } => write!(f, "invalid --id value: {raw}"),
            ArgsError::InvalidQuestions { raw } => {
                write!(f, "invalid --questions value (expected 1-{}): {raw}", SAMPLES.len())
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

struct Sample {
    prompt: &'static str,
    choices: &'static [&'static str],
    answer: &'static [usize],
    explanation: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        prompt: "Which layer of the OSI model does IP operate at?",
        choices: &["Physical", "Data link", "Network", "Transport"],
        answer: &[2],
        explanation: "IP is a layer 3 (network) protocol.",
    },
    Sample {
        prompt: "Which port does HTTPS use by default?",
        choices: &["80", "443", "22", "8080"],
        answer: &[1],
        explanation: "HTTPS listens on TCP 443 unless configured otherwise.",
    },
    Sample {
        prompt: "Select the two connection-oriented protocols.",
        choices: &["TCP", "UDP", "SCTP", "ICMP"],
        answer: &[0, 2],
        explanation: "TCP and SCTP set up associations before sending data.",
    },
    Sample {
        prompt: "What does DNS resolve?",
        choices: &["MAC addresses", "Host names", "VLAN ids"],
        answer: &[1],
        explanation: "DNS maps host names to addresses.",
    },
    Sample {
        prompt: "Which address is a private IPv4 address?",
        choices: &["8.8.8.8", "172.16.4.1", "1.1.1.1", "100.64.0.1"],
        answer: &[1],
        explanation: "172.16.0.0/12 is reserved for private networks by RFC 1918.",
    },
];

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut root = std::env::var("QUIZ_TESTS_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from);
        let mut raw_id = std::env::var("QUIZ_TEST").unwrap_or_else(|_| "sample".into());
        let mut title = "Networking Basics".to_string();
        let mut questions = 3_u32;
        let mut force = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--root" => root = PathBuf::from(require_value(&mut args, "--root")?),
                "--id" => raw_id = require_value(&mut args, "--id")?,
                "--title" => title = require_value(&mut args, "--title")?,
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| (1..=SAMPLES.len()).contains(&(*n as usize)))
                        .ok_or(ArgsError::InvalidQuestions { raw: value })?;
                }
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let test_id = TestId::new(raw_id.clone()).map_err(|_| ArgsError::InvalidTestId { raw: raw_id })?;

        Ok(Self {
            root,
            test_id,
            title,
            questions,
            force,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --root <dir>              Directory holding tests/ (default: .)");
    eprintln!("  --id <test-id>            Test id to write (default: sample)");
    eprintln!("  --title <text>            Test title (default: Networking Basics)");
    eprintln!("  --questions <n>           Number of sample questions, 1-{} (default: 3)", SAMPLES.len());
    eprintln!("  --force                   Overwrite an existing test.json");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_TESTS_DIR, QUIZ_TEST");
}

fn build_record(title: &str, questions: u32) -> TestDefinitionRecord {
    let questions = SAMPLES
        .iter()
        .take(questions as usize)
        .enumerate()
        .map(|(i, sample)| {
            let answer = match sample.answer {
                [single] => AnswerKey::Single(*single),
                many => AnswerKey::Multiple(many.to_vec()),
            };
            QuestionRecord {
                id: QuestionId::from(i as u64 + 1),
                prompt: sample.prompt.to_string(),
                image: None,
                image_alt: None,
                choices: sample.choices.iter().map(|c| (*c).to_string()).collect(),
                required_answers: (sample.answer.len() > 1).then_some(sample.answer.len()),
                answer,
                explanation: Some(sample.explanation.to_string()),
            }
        })
        .collect();

    TestDefinitionRecord {
        title: title.to_string(),
        code: "NET-101".to_string(),
        questions,
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let record = build_record(&args.title, args.questions);
    // Refuse to write a document the loader would reject.
    TestDefinition::from_record(args.test_id.clone(), record.clone(), args.test_id.base_path())?;

    let path = args.root.join(args.test_id.resource_path());
    if path.exists() && !args.force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, serde_json::to_vec_pretty(&record)?).await?;

    let repo = FsTestRepository::new(&args.root);
    let listed = repo.list_tests().await?;

    println!(
        "Wrote {} questions to {} ({} tests under {})",
        args.questions,
        path.display(),
        listed.len(),
        args.root.display()
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
