mod debug_report;

use colloquy::{Brain, Context, DEFAULT_TOPIC};
use std::io::{self, IsTerminal, Read};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("colloquy=warn")))
        .with_writer(io::stderr)
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut brain = Brain::new();
    let mut loads = Vec::new();
    for path in &config.scripts {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: failed to read '{path}': {err}");
                std::process::exit(2);
            }
        };
        match brain.stream(&source) {
            Ok(report) => loads.push((path.clone(), report)),
            Err(err) => {
                eprintln!("error: {path}: {err}");
                std::process::exit(1);
            }
        }
    }

    let metrics = brain.sort_all();
    let sorted = brain.sorted_triggers(&config.topic).unwrap_or_default();

    let context = Context { previous_reply: config.previous };
    let start = Instant::now();
    let result = match brain.match_with(&config.topic, &config.input, &context) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let match_time = start.elapsed();

    let run = debug_report::Run {
        topic: &config.topic,
        input: &config.input,
        loads: &loads,
        metrics: &metrics,
        sorted: &sorted,
        result: result.as_ref(),
        match_time,
    };
    debug_report::print_run(&run, config.color);
}

struct CliConfig {
    scripts: Vec<String>,
    topic: String,
    previous: Option<String>,
    input: String,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut scripts = Vec::new();
    let mut topic = DEFAULT_TOPIC.to_string();
    let mut previous: Option<String> = None;
    let mut input: Option<String> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("colloquy {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--script" | "-s" => {
                let value = args.next().ok_or_else(|| "error: --script expects a path".to_string())?;
                scripts.push(value);
            }
            "--topic" | "-t" => {
                topic = args.next().ok_or_else(|| "error: --topic expects a value".to_string())?;
            }
            "--previous" | "-p" => {
                previous = Some(args.next().ok_or_else(|| "error: --previous expects a value".to_string())?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--script=") => scripts.push(arg.trim_start_matches("--script=").to_string()),
            _ if arg.starts_with("--topic=") => topic = arg.trim_start_matches("--topic=").to_string(),
            _ if arg.starts_with("--previous=") => previous = Some(arg.trim_start_matches("--previous=").to_string()),
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { scripts, topic, previous, input: input.trim().to_string(), color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "colloquy {version}

Load trigger scripts, sort them, and show how one message matches.

Usage:
  colloquy [OPTIONS] [--] <message...>

Options:
  -s, --script <path>        Script file to load. Repeatable; loaded in order.
  -t, --topic <name>         Topic to match in. Default: {default_topic}
  -p, --previous <text>      The bot's previous reply, for %previous triggers.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

The message is read from stdin when no arguments are given.
Logging is controlled with RUST_LOG (default: colloquy=warn).

Exit codes:
  0  Success, matched or not.
  1  Script rejected or topic unknown.
  2  Invalid arguments, missing input or unreadable script.
",
        version = env!("CARGO_PKG_VERSION"),
        default_topic = DEFAULT_TOPIC
    )
}
