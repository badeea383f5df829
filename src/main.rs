mod calc;
mod config;
mod repl;

use anyhow::{Context, Result};
use calc::Calculator;
use calc::observers::{AuditLogObserver, AutoSaveObserver};
use calc::persistence::CsvHistoryFile;
use clap::{Command, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{Generator, Shell, generate};
use config::{Config, ConfigError, KEYS};
use repl::app::Repl;
use repl::ui::Painter;
use std::io;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calculator")]
#[command(about = "An interactive decimal calculator with undo/redo and saved history")]
struct Cli {
    #[arg(long, global = true, help = "Disable colored output")]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Set a configuration value in the config file")]
    Set {
        #[arg(help = "Configuration key")]
        key: String,
        #[arg(help = "Configuration value", value_hint = ValueHint::Other)]
        value: String,
    },
    #[command(about = "Get the effective value of a configuration key")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },
    #[command(about = "List all effective configuration values")]
    List,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { action }) => {
            if let Err(e) = handle_config_command(action) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        None => {
            let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
            if let Err(e) = run_main_app(Painter::new(color)) {
                eprintln!("Fatal error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn handle_config_command(action: ConfigAction) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Set { key, value } => {
            let path = config::get_config_file_path()?;
            // Only the file is rewritten; environment overrides stay out of it.
            let mut config = Config::load_from(Some(&path), |_| None)?;
            config.set(&key, &value)?;
            config.validate()?;
            config.save()?;
            println!("Configuration saved successfully.");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CALCULATOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_main_app(painter: Painter) -> Result<()> {
    let config = Config::load().context("Configuration error")?;
    init_tracing();

    let calculator = build_calculator(config);
    let stdin = io::stdin();
    let mut repl = Repl::new(calculator, stdin.lock(), io::stdout(), painter);
    repl.run()
}

fn build_calculator(config: Config) -> Calculator {
    let history_file = CsvHistoryFile::new(&config.history_file);
    let log_file = config.log_file.clone();
    let auto_save = config.auto_save;

    let mut calculator = Calculator::new(config, Box::new(history_file.clone()));

    match AuditLogObserver::open(&log_file) {
        Ok(observer) => {
            calculator.register_observer(Box::new(observer));
        }
        Err(e) => warn!("Audit log disabled: {:#}", e),
    }
    calculator.register_observer(Box::new(AutoSaveObserver::new(
        auto_save,
        Box::new(history_file),
    )));

    if let Err(e) = calculator.load_history() {
        warn!("Starting with empty history: {}", e);
    }
    // The restored session is the baseline; there is nothing before it to undo.
    calculator.reset_undo_redo();

    calculator
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
