//! CLI tool to check and inspect Perl-like source files.

use std::fs;
use std::process::ExitCode;

use log::{LevelFilter, Log, Metadata, Record};

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Level from `PLFRONT_LOG`, `warn` when unset or unrecognized.
fn init_logging() {
    let level = std::env::var("PLFRONT_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: plfront <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  check   Parse file(s) and report what was found");
        eprintln!("  dump    Print the syntax tree as S-expressions");
        eprintln!("  tokens  Print the token stream");
        eprintln!();
        eprintln!("Set PLFRONT_LOG=debug or PLFRONT_LOG=trace to see parser decisions.");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let files = &args[2..];

    if !matches!(command, "check" | "dump" | "tokens") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }
    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        if command == "tokens" {
            for token in plfront::tokenize(&content) {
                println!(
                    "{}:{}\t{:?}\t{:?}",
                    token.span.line, token.span.column, token.kind, token.text
                );
            }
            continue;
        }

        match plfront::parse_str(&content) {
            Ok(program) if command == "dump" => print!("{}", plfront::format(&program)),
            Ok(program) => {
                let statements = program.statements.len();
                let heredocs = program.heredoc_count();
                eprintln!("{path}: ok ({statements} statement(s), {heredocs} heredoc(s))");
            }
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
