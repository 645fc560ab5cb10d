use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, Level};

use clipform::config::{Config, CONFIG_ENV_VAR};
use clipform::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "clipform")]
#[command(about = "Detect and transform snippets of text: arithmetic, date ranges, units, phone numbers and more")]
#[command(version)]
struct Args {
    /// Text to transform; read from stdin when omitted
    text: Vec<String>,

    /// TOML configuration file (defaults to $CLIPFORM_CONFIG when set)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Only show how the input splits into prefix and seed
    #[arg(long)]
    seed: bool,

    /// Reference date (YYYY-MM-DD) for inferring missing years
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Log detector activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let path = explicit
        .cloned()
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
    match path {
        Some(path) => Config::load(&path),
        None => Ok(Config::default()),
    }
}

fn read_input(args: &Args) -> Result<String> {
    if !args.text.is_empty() {
        return Ok(args.text.join(" "));
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    Ok(input)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // WHY: stdout carries the transformed text, so logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .json()
        .init();

    debug!(?args, "Parsed CLI arguments");

    let config = load_config(args.config.as_ref())?;
    let mut pipeline = Pipeline::new(config)?;
    if let Some(today) = args.today {
        pipeline = pipeline.with_today(today);
    }

    let input = read_input(&args)?;

    if args.seed {
        let seed = pipeline.extract_seed(&input);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&seed)?);
        } else {
            println!("{}\t{}", seed.prefix, seed.seed);
        }
        return Ok(());
    }

    let output = pipeline.process(&input);
    info!(changed = output.changed, matched = ?output.matched_id, "Processed input");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(effect) = &output.side_effect {
        eprintln!("{}", effect.message);
    }
    if output.text.ends_with('\n') {
        print!("{}", output.text);
    } else {
        println!("{}", output.text);
    }
    Ok(())
}
