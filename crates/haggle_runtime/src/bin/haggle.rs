//! Haggle CLI entry point.

use haggle_engine::EngineConfig;
use haggle_runtime::{Repl, RuntimeConfig, Session};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    scripts: Vec<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    config_file: Option<PathBuf>,
    log_filter: Option<String>,
    json: bool,
    preset: Option<EngineConfig>,
    session: Option<String>,
    coverage_out: Option<PathBuf>,
    report: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value(args: &[String], i: usize, flag: &str) -> Result<String, Box<dyn std::error::Error>> {
    args.get(i).cloned().ok_or_else(|| format!("{flag} requires a value").into())
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--json" => config.json = true,
            "--report" => config.report = true,
            "--strict" => config.preset = Some(EngineConfig::strict()),
            "--lenient" => config.preset = Some(EngineConfig::lenient()),
            flag @ ("-c" | "--config") => {
                i += 1;
                config.config_file = Some(PathBuf::from(value(&args, i, flag)?));
            }
            flag @ "--log" => {
                i += 1;
                config.log_filter = Some(value(&args, i, flag)?);
            }
            flag @ "--session" => {
                i += 1;
                config.session = Some(value(&args, i, flag)?);
            }
            flag @ "--coverage-out" => {
                i += 1;
                config.coverage_out = Some(PathBuf::from(value(&args, i, flag)?));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.scripts.push(PathBuf::from(path)),
        }
        i += 1;
    }

    Ok(config)
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("haggle {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(cli.log_filter.as_deref());

    let mut config = match &cli.config_file {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(preset) = cli.preset {
        config.engine = preset;
    }
    if let Some(session) = cli.session {
        config.session = session;
    }
    if cli.json {
        config.json = true;
    }
    tracing::debug!(session = %config.session, json = config.json, "starting");

    let session = Session::new(&config)?;
    let mut repl = Repl::new(session)?
        .with_prompt(config.prompt.clone())
        .with_json(config.json);

    let stdout = io::stdout();
    for script in &cli.scripts {
        let file = File::open(script).map_err(|e| format!("failed to open '{}': {e}", script.display()))?;
        let evaluated = repl.run_script(BufReader::new(file), &mut stdout.lock())?;
        tracing::info!(script = %script.display(), evaluated, "script finished");
    }

    if !cli.batch_mode {
        if !cli.scripts.is_empty() {
            repl = repl.without_banner();
        }
        repl.run()?;
    }

    let coverage = repl.session().coverage();
    if cli.report {
        println!("{}", coverage.report());
    }
    if let Some(path) = &cli.coverage_out {
        coverage.export_to_file(path)?;
        eprintln!("wrote {} coverage records to {}", coverage.len(), path.display());
    }
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mHaggle\x1b[0m - Command parser for trading, crafting and business commands

\x1b[1mUSAGE:\x1b[0m
    haggle [OPTIONS] [SCRIPTS...]

\x1b[1mARGUMENTS:\x1b[0m
    [SCRIPTS...]    Files of commands to run before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help             Print help information
    -V, --version          Print version information
    -b, --batch            Run scripts and exit (no REPL)
    -c, --config FILE      Load a JSON runtime configuration
    --json                 Print responses as JSON
    --strict               Only accept near-certain commands
    --lenient              Accept more readily and tolerate typos
    --session NAME         Session id for typed commands

\x1b[1mDIAGNOSTIC OPTIONS:\x1b[0m
    --log FILTER           Tracing filter (overrides RUST_LOG), e.g. haggle_engine=debug
    --report               Print the grammar coverage report on exit
    --coverage-out PATH    Write the coverage log as MessagePack on exit

\x1b[1mEXAMPLES:\x1b[0m
    haggle                                  Start interactive REPL
    haggle -b --report commands.txt         Run a script and report coverage
    haggle --lenient --log debug            Typo-tolerant REPL with debug logs

\x1b[1mREPL COMMANDS:\x1b[0m
    :help                Meta-commands
    :examples            One example per intent
    Ctrl+D               Exit REPL
    Ctrl+C               Drop an outstanding question"
    );
}
