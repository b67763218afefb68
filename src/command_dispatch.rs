//! Purpose: Hold top-level CLI command dispatch for `agent-explorer`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Rendered answers go to stdout; prompts and progress go to stderr.
use std::io::{self, BufRead, IsTerminal, Write};
use std::net::SocketAddr;

use agent_explorer::agent::Agent;
use agent_explorer::agent::providers::HttpProviderConfig;
use agent_explorer::api::{AskClient, ClientConfig, Error, ErrorKind};
use agent_explorer::batch::run_batch;
use agent_explorer::core::value::StructuredValue;
use agent_explorer::render::{html, json_text, present, text};
use agent_explorer::server::{self, DEFAULT_CORS_ORIGINS, ServeConfig};
use agent_explorer::session::{Session, SessionEvent};

use super::{ClientArgs, ColorMode, Command, OutputFormat, RunOutcome, parse_duration};

pub(super) fn dispatch_command(
    command: Command,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Ask {
            question,
            client,
            format,
        } => {
            let client = ask_client(&client)?;
            let fields = client.ask(&question)?;
            let use_color = color_mode.use_color(io::stdout().is_terminal());
            let rendered = match format {
                OutputFormat::Text => text::to_text(&present(&fields), use_color),
                OutputFormat::Html => html::to_html(&present(&fields)),
                OutputFormat::Json => {
                    json_text::pretty(&StructuredValue::Mapping(fields), use_color)
                }
            };
            println!("{rendered}");
            Ok(RunOutcome::ok())
        }
        Command::Explore { client } => {
            let client = ask_client(&client)?;
            explore(&client, color_mode)?;
            Ok(RunOutcome::ok())
        }
        Command::Serve {
            bind,
            allow_non_loopback,
            cors_origins,
            provider_timeout,
        } => {
            let bind: SocketAddr = bind.parse().map_err(|_| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid bind address: {bind}"))
                    .with_hint("Use a host:port value like 127.0.0.1:8000.")
            })?;
            let cors_origins = if cors_origins.is_empty() {
                DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
            } else {
                cors_origins
            };
            let config = ServeConfig {
                bind,
                allow_non_loopback,
                cors_origins,
            };
            let agent = http_agent(&provider_timeout)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(server::serve(config, agent))?;
            Ok(RunOutcome::ok())
        }
        Command::Batch {
            input,
            output,
            provider_timeout,
        } => {
            let agent = http_agent(&provider_timeout)?;
            let summary = run_batch(&agent, &input, &output)?;
            eprintln!(
                "Answered {} of {} questions; saved to {}",
                summary.answered,
                summary.questions,
                output.display()
            );
            Ok(RunOutcome::ok())
        }
    }
}

fn ask_client(args: &ClientArgs) -> Result<AskClient, Error> {
    AskClient::new(ClientConfig {
        endpoint: args.endpoint.clone(),
        timeout: parse_duration(&args.timeout)?,
    })
}

fn http_agent(provider_timeout: &str) -> Result<Agent, Error> {
    let config = HttpProviderConfig {
        timeout: parse_duration(provider_timeout)?,
        ..HttpProviderConfig::default()
    };
    Agent::with_http(&config)
}

fn explore(client: &AskClient, color_mode: ColorMode) -> Result<(), Error> {
    let interactive = io::stdin().is_terminal();
    let use_color = color_mode.use_color(io::stdout().is_terminal());
    let mut session = Session::new();
    let mut lines = io::stdin().lock().lines();

    loop {
        if interactive {
            eprint!("question> ");
            let _ = io::stderr().flush();
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read question")
                .with_source(err)
        })?;
        if line.trim().is_empty() {
            continue;
        }
        session = session
            .apply(SessionEvent::QuestionEdited(line))
            .submit(|question| client.ask(question));
        println!("{}\n", text::to_text(&session.view(), use_color));
    }
    Ok(())
}
