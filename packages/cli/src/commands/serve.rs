use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use visedit_editor::Document;
use visedit_workspace::{AppState, SurfaceMode};

use super::load_document;
use crate::config::Config;

/// Document opened when `serve` is run without a file
const STARTER_DOCUMENT: &str = r#"<div className="landing" style={{ padding: '48px', fontFamily: 'Inter, sans-serif' }}>
  <h1 style={{ fontSize: '28px', fontWeight: 700 }}>AcMem</h1>
  <p style={{ color: '#555' }}>Memory for teams that ship.</p>
  <input type="email" placeholder="Your work email" />
  <button style={{ background: '#3366FF', color: 'white' }}>Join waitlist</button>
</div>
"#;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Markup file to open (a starter page when omitted)
    pub file: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Wait for a browser rendering surface on /ws instead of rendering in-process
    #[arg(long)]
    pub remote_surface: bool,
}

pub fn serve(args: ServeArgs, config: &Config) -> Result<()> {
    let document = match &args.file {
        Some(path) => load_document(path)?,
        None => Document::initialize(STARTER_DOCUMENT)?,
    };

    let surface = if args.remote_surface {
        SurfaceMode::Remote
    } else {
        SurfaceMode::Local
    };
    let server_config = config.server_config(surface);
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port.unwrap_or(config.port)));

    println!("{}", "Starting visedit designer server...".bright_blue().bold());
    println!("   Document: {}", document.path.display());
    println!("   API:      http://{}/api/document", addr);
    if args.remote_surface {
        println!("   Surface:  ws://{}/ws", addr);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let state = AppState::new(document, &server_config);
        visedit_workspace::serve(state, addr).await
    })?;
    Ok(())
}
