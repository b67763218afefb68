//! Purpose: `agent-explorer` CLI entry point.
//! Role: Binary crate root; parses args, bootstraps logging, delegates to `command_dispatch`.
//! Invariants: Answers go to stdout; diagnostics and prompts go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

use agent_explorer::api::{DEFAULT_ENDPOINT, Error, ErrorKind, to_exit_code};
use agent_explorer::server::DEFAULT_BIND;

mod command_dispatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    init_tracing(match cli.command {
        Command::Serve { .. } | Command::Batch { .. } => "info",
        Command::Ask { .. } | Command::Explore { .. } => "warn",
    });

    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "agent-explorer",
    version,
    about = "Ask questions of a fact-checking agent and render its answers",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"The agent answers over HTTP; the client renders each JSON field.

Mental model:
  - `serve` runs the agent on POST /ask
  - `ask` sends one question and prints the answer
  - `explore` keeps a session open, one question per line
"#,
    after_help = r#"EXAMPLES
  $ agent-explorer serve                                  # Terminal 1
  $ agent-explorer ask "When was the Eiffel Tower completed?"   # Terminal 2
  $ agent-explorer batch --input questions.json --output answers.json

LEARN MORE
  $ agent-explorer <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize rendered answers and stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

#[derive(Args, Clone, Debug)]
struct ClientArgs {
    #[arg(long, default_value = DEFAULT_ENDPOINT, help = "Answer endpoint URL")]
    endpoint: String,
    #[arg(
        long,
        default_value = "60s",
        help = "Request timeout (e.g. 500ms, 30s, 2m)"
    )]
    timeout: String,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Ask one question and print the rendered answer",
        after_help = r#"EXAMPLES
  $ agent-explorer ask "Who wrote Hamlet?"
  $ agent-explorer ask --format json "what is 12 + 30"
  $ agent-explorer ask --format html "best pizza in Naples" > answer.html"#
    )]
    Ask {
        #[arg(help = "Question text, sent as-is")]
        question: String,
        #[command(flatten)]
        client: ClientArgs,
        #[arg(
            long,
            default_value = "text",
            value_enum,
            help = "Output format: text|html|json"
        )]
        format: OutputFormat,
    },
    #[command(
        about = "Interactive session: one question per line, answers rendered after each",
        after_help = r#"NOTES
  - Blank lines are ignored; end input (Ctrl-D) to quit.
  - A failed request shows the error above the last good answer."#
    )]
    Explore {
        #[command(flatten)]
        client: ClientArgs,
    },
    #[command(
        about = "Serve the fact-checking agent over HTTP",
        after_help = r#"EXAMPLES
  $ agent-explorer serve
  $ agent-explorer serve --bind 127.0.0.1:9000 --cors-origin http://localhost:3000

NOTES
  - Loopback-only unless --allow-non-loopback is given.
  - RUST_LOG overrides the default `info` log level."#
    )]
    Serve {
        #[arg(long, default_value = DEFAULT_BIND, help = "Address to listen on")]
        bind: String,
        #[arg(long, help = "Allow binding a non-loopback address")]
        allow_non_loopback: bool,
        #[arg(
            long = "cors-origin",
            value_name = "ORIGIN",
            help = "Allowed browser origin (repeatable; default: local dev origins)"
        )]
        cors_origins: Vec<String>,
        #[arg(
            long,
            default_value = "10s",
            help = "Timeout for each upstream provider request"
        )]
        provider_timeout: String,
    },
    #[command(
        about = "Answer a JSON file of questions and write the reports",
        after_help = r#"INPUT
  A JSON array of strings or objects with an `input` or `query` field.

EXAMPLES
  $ agent-explorer batch --input data/input_questions.json --output answers.json"#
    )]
    Batch {
        #[arg(long, value_hint = ValueHint::FilePath, help = "Questions file")]
        input: PathBuf,
        #[arg(
            long,
            default_value = "answers.json",
            value_hint = ValueHint::FilePath,
            help = "Where to write the reports"
        )]
        output: PathBuf,
        #[arg(
            long,
            default_value = "10s",
            help = "Timeout for each upstream provider request"
        )]
        provider_timeout: String,
    },
}

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_duration(input: &str) -> Result<Duration, Error> {
    let invalid = || {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid duration: {input}"))
            .with_hint("Use a number plus ms|s|m|h (e.g. 10s).")
    };
    let trimmed = input.trim();
    let split = trimmed.char_indices().find(|(_, ch)| !ch.is_ascii_digit());
    let (num_str, unit) = match split {
        Some((idx, _)) => trimmed.split_at(idx),
        None => return Err(invalid()),
    };
    if num_str.is_empty() {
        return Err(invalid());
    }
    let value: u64 = num_str.parse().map_err(|_| invalid())?;
    let millis = match unit {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        _ => return Err(invalid()),
    };
    Ok(Duration::from_millis(millis))
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(err.display_message()));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        err.display_message()
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let subcommand = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .and_then(|usage| {
            let mut tokens = usage.split_whitespace();
            tokens.find(|token| *token == "agent-explorer")?;
            tokens
                .next()
                .filter(|token| !token.starts_with(['-', '<', '[']))
        });
    match subcommand {
        Some(name) => format!("Try `agent-explorer {name} --help`."),
        None => "Try `agent-explorer --help`.".to_string(),
    }
}
