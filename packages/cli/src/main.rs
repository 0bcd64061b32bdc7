mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, edit, serve, tag, CheckArgs, EditArgs, ServeArgs, TagArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Visedit - edit markup visually, keep the source yours
#[derive(Parser, Debug)]
#[command(name = "visedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter when RUST_LOG is unset (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate every element with a stable data-uid
    Tag(TagArgs),

    /// Change one element's text or inline style
    Edit(EditArgs),

    /// Parse a file and report errors with context
    Check(CheckArgs),

    /// Run the designer server
    Serve(ServeArgs),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match cli.command {
        Command::Tag(args) => tag(args),
        Command::Edit(args) => edit(args),
        Command::Check(args) => check(args),
        Command::Serve(args) => serve(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
