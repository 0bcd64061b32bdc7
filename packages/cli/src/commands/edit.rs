use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use visedit_editor::{ElementUpdate, MutationResult, StyleMap};

use super::{emit, load_document};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Markup file to edit
    pub file: PathBuf,

    /// Identifier of the element to change
    #[arg(long)]
    pub uid: String,

    /// Replace the element's children with this text
    #[arg(long)]
    pub text: Option<String>,

    /// Inline style property to set, as name=value (repeatable)
    #[arg(long = "style", value_parser = parse_style_pair)]
    pub styles: Vec<(String, String)>,

    /// Write the result back instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

fn parse_style_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

pub fn edit(args: EditArgs) -> Result<()> {
    let update = ElementUpdate {
        text: args.text,
        style: args.styles.into_iter().collect::<StyleMap>(),
    };
    if update.is_empty() {
        return Err(anyhow!("Nothing to change: pass --text and/or --style"));
    }

    let original = std::fs::read_to_string(&args.file)?;
    let mut doc = load_document(&args.file)?;

    match doc.update(&args.uid, &update)? {
        MutationResult::Applied { .. } => {}
        MutationResult::Noop { reason } => {
            eprintln!("{} {}", "Skipped:".yellow().bold(), reason);
        }
    }

    if emit(&doc, &original, args.write)? {
        eprintln!("{} {}", "Updated".green().bold(), args.file.display());
    }
    Ok(())
}
