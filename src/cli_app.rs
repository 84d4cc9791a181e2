//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{ArgAction, Parser};
use regex::Regex;
use thiserror::Error;

use keytally::core::config::Config;
use keytally::core::errors::TallyError;
use keytally::logger::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use keytally::store::{RecordStore, codec};
use keytally::tally::{SessionOutcome, TallyModel, feed_batch, render};
use keytally::tui::run_session;

/// Matches a pre-seed argument: `-X=LABEL`.
static SEED_ARG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^-(\S)=(\S+)$").ok());

/// Count keystrokes per key, with relabeling and manual adjustment.
#[derive(Debug, Parser)]
#[command(
    name = "keytally",
    version,
    about = "Tally keystrokes per key",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Append session events to this JSONL file.
    #[arg(long, value_name = "PATH")]
    activity_log: Option<PathBuf>,
    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
    /// Print version.
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
    /// `-X=LABEL` seeds key X with LABEL; anything else is the tally file.
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    args: Vec<String>,
}

/// CLI-level errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Tally(#[from] TallyError),
    /// Terminal or stdio failure.
    #[error("failed to drive terminal: {0}")]
    Io(#[from] io::Error),
}

/// Positional arguments split into seeds and the save path.
#[derive(Debug, Default, PartialEq, Eq)]
struct LaunchArgs {
    seeds: Vec<(char, String)>,
    save_path: Option<PathBuf>,
}

fn parse_launch_args(args: &[String]) -> LaunchArgs {
    let mut launch = LaunchArgs::default();
    for arg in args {
        match parse_seed(arg) {
            Some(seed) => launch.seeds.push(seed),
            None => launch.save_path = Some(PathBuf::from(arg)),
        }
    }
    launch
}

fn parse_seed(arg: &str) -> Option<(char, String)> {
    let caps = SEED_ARG.as_ref()?.captures(arg)?;
    let key = caps.get(1)?.as_str().chars().next()?;
    Some((key, caps.get(2)?.as_str().to_string()))
}

/// Dispatch a parsed CLI invocation.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.activity_log {
        config.log.activity_file = Some(path.clone());
    }
    let mut log = JsonlWriter::open(JsonlConfig::from(&config.log));
    log.write_entry(
        &LogEntry::new(EventType::SessionStart, Severity::Info).with_path(&config.config_file),
    );

    let result = run_session_with_log(cli, &config, &mut log);
    if let Err(CliError::Tally(err)) = &result {
        log.write_entry(&LogEntry::from_error(err));
    }
    log.flush();
    result
}

fn run_session_with_log(cli: &Cli, config: &Config, log: &mut JsonlWriter) -> Result<(), CliError> {
    let launch = parse_launch_args(&cli.args);
    let save_path = launch.save_path.or_else(|| config.persistence.file.clone());

    let mut store = RecordStore::new();
    for (key, label) in launch.seeds {
        log.write_entry(&LogEntry::new(EventType::KeySeeded, Severity::Info).with_key(key, &label));
        store.seed(key, label);
    }

    let loaded = codec::load(save_path.as_deref())?;
    if let Some(path) = &save_path {
        log.write_entry(
            &LogEntry::new(EventType::StoreLoaded, Severity::Info)
                .with_path(path)
                .with_records(loaded.len()),
        );
    }
    store.absorb(loaded);

    let mut model = TallyModel::new(store);
    let outcome = if io::stdin().is_terminal() {
        run_session(&mut model, &config.render, log)?
    } else {
        let mut raw = Vec::new();
        io::stdin().read_to_end(&mut raw)?;
        let input = String::from_utf8_lossy(&raw);
        feed_batch(&mut model, &input, |transition| {
            log.record_transition(transition);
        })
    };

    let mut stdout = io::stdout();
    stdout.write_all(render(&model, &config.render).as_bytes())?;
    stdout.flush()?;

    match outcome {
        SessionOutcome::Abort => {
            log.write_entry(&LogEntry::new(EventType::SessionAbort, Severity::Info));
        }
        SessionOutcome::Save => {
            if let Some(path) = codec::save(save_path.as_deref(), &model.store)? {
                log.write_entry(
                    &LogEntry::new(EventType::StoreSaved, Severity::Info)
                        .with_path(&path)
                        .with_records(model.store.len()),
                );
            }
        }
    }
    Ok(())
}
