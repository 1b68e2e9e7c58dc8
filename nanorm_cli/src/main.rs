mod command;
mod exec;
mod format;
mod parser;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use nanorm_core::{Backend, FlushPolicy, StorageConfig, open_storage};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Inspect and edit a nanorm store.
#[derive(Debug, Parser)]
#[command(name = "nanorm", version)]
struct Args {
    /// Store path (overrides the config file)
    path: Option<PathBuf>,

    /// Backend: file|sqlite
    #[arg(long)]
    backend: Option<Backend>,

    /// FileStorage flush policy: every_write|on_disconnect
    #[arg(long)]
    flush: Option<FlushPolicy>,

    /// JSON storage config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_config(args: &Args) -> anyhow::Result<StorageConfig> {
    let mut config = match (&args.config, &args.path) {
        (Some(file), _) => StorageConfig::from_json_file(file)
            .with_context(|| format!("loading config {}", file.display()))?,
        (None, Some(path)) => StorageConfig::new(Backend::default(), path),
        (None, None) => bail!("a store path or --config is required"),
    };
    if let Some(path) = &args.path {
        config.path = path.clone();
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(flush) = args.flush {
        config.flush = flush;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;
    debug!(?config, "opening store");
    let mut storage = open_storage(&config)
        .with_context(|| format!("opening {} store at {}", config.backend, config.path.display()))?;

    println!("nanorm ({} store at {}; type 'help' or 'exit')", config.backend, config.path.display());

    loop {
        print!("nanorm> ");
        io::stdout().flush()?;

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "failed to read input");
                continue;
            }
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            println!("Commands:");
            println!("  tables                                   -> list tables");
            println!("  schema <table>                           -> show columns");
            println!("  create <table> <col>:<int|str> ...       -> declare a table");
            println!("  insert <table> <col>=<value> ...         -> append a row");
            println!("  select <table> [<col>=<value> ...]       -> matching rows");
            println!("  update <table> [<col>=<value> ...] set <col>=<value> ...");
            println!("  exit|quit                                -> quit");
            continue;
        }

        let cmd = match parser::parse(input) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("Parse error: {e}");
                continue;
            }
        };

        match exec::execute(storage.as_mut(), cmd) {
            Ok(out) => println!("{out}"),
            Err(err) => println!("{err}"),
        }
    }

    storage.disconnect().context("closing store")?;
    Ok(())
}
