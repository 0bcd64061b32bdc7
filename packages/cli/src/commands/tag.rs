use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{emit, load_document};

#[derive(Debug, Args)]
pub struct TagArgs {
    /// Markup file to annotate
    pub file: PathBuf,

    /// Write the annotated text back instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

pub fn tag(args: TagArgs) -> Result<()> {
    let original = std::fs::read_to_string(&args.file)?;
    let doc = load_document(&args.file)?;

    let written = emit(&doc, &original, args.write)?;
    if args.write {
        let status = if written { "Tagged".green().bold() } else { "Unchanged".dimmed() };
        eprintln!("{} {} ({} elements)", status, args.file.display(), doc.index().len());
    }
    Ok(())
}
