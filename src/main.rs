use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;

use geeco::config::DEFAULT_MAX_DEPTH;
use geeco::{run_templated_script, RunConfig, Syntax};

#[derive(Parser)]
#[command(name = "geeco", version)]
#[command(about = "Generate source files from JSON data, templates and a driving script")]
struct Cli {
    /// Entry template; its rendered output is run as the driving script
    #[arg(short, long)]
    script: PathBuf,

    /// JSON data file bound as the global template data
    #[arg(short, long)]
    json: PathBuf,

    /// Work folder that relative paths resolve against
    #[arg(short, long, default_value = ".")]
    work: PathBuf,

    /// Tag start delimiter
    #[arg(long, default_value = "{{")]
    begin: String,

    /// Continuation delimiter
    #[arg(long = "continue", default_value = "||")]
    cont: String,

    /// Tag end delimiter
    #[arg(long, default_value = "}}")]
    end: String,

    /// Maximum block nesting while rendering
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let syntax = Syntax::new(&cli.begin, &cli.cont, &cli.end)?;
    let config = RunConfig::new(&cli.script, &cli.json, &cli.work)
        .with_syntax(syntax)
        .with_max_depth(cli.max_depth);

    run_templated_script(config)
        .with_context(|| format!("Generation from '{}' failed", cli.script.display()))?;

    Ok(())
}
