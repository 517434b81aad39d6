use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use lox_interpreter as lox;

use lox::scanner::Scanner;
use lox::{Lox, LoxError, Reporter, Status};

/// Exit code for malformed input (lexical, syntax or resolution errors).
const EXIT_DATA_ERR: u8 = 65;

/// Exit code for a program aborted by a runtime error.
const EXIT_SOFTWARE: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt
    Repl,
}

/// Prints diagnostics to stderr as they arrive.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, error: LoxError) {
        debug!("Diagnostic: {}", error);
        eprintln!("{}", error);
    }
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'lox_interpreter::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("lox_interpreter::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<ExitCode> {
    let source = read_file(filename)?;
    let mut tokens = Vec::new();
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        let rendered =
            serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?;
        println!("{}", rendered);
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EXIT_DATA_ERR);
        return Ok(ExitCode::from(EXIT_DATA_ERR));
    }

    Ok(ExitCode::SUCCESS)
}

fn run(filename: &Path) -> Result<ExitCode> {
    let source = read_file(filename)?;
    let mut session = Lox::new();

    let code = match session.run_source(&source, &mut ConsoleReporter) {
        Status::Success => ExitCode::SUCCESS,
        Status::StaticError => ExitCode::from(EXIT_DATA_ERR),
        Status::RuntimeError => ExitCode::from(EXIT_SOFTWARE),
    };

    Ok(code)
}

fn repl() -> Result<ExitCode> {
    let mut session = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        let status = session.run_source(&line, &mut ConsoleReporter);
        debug!("REPL line finished with {:?}", status);
    }

    println!();

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json),
        Commands::Run { filename } => run(filename),
        Commands::Repl => repl(),
    }
}
