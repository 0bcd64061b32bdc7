//! # Rendering Surface
//!
//! The isolated side of the preview boundary. A surface only ever sees the
//! source text and identifiers; it talks to the host through a pair of
//! channels ([`link`]) and is scheduled independently of it.
//!
//! ## State machine
//!
//! ```text
//!                  render ok
//! Uninitialized ──────────────→ Rendered ──┐ render (full reset)
//!       ↑   │       render err      ↑  └───┘
//!       │   └─────────────→ Failed ─┘ render ok
//! ```
//!
//! [`LocalSurface`] is the in-process surface used by the CLI, the server
//! when no browser is attached, and the tests. What "rendering" means is left
//! to its [`Renderer`].

use crate::{HostMessage, SurfaceMessage};
use std::collections::HashMap;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use visedit_common::visitor::{walk_element, Visitor};
use visedit_common::StyleMap;
use visedit_editor::tagger::element_uid;
use visedit_editor::inline_style;
use visedit_parser::ast::Element;
use visedit_parser::parse;

/// Host's end of the boundary
#[derive(Debug)]
pub struct SurfaceLink {
    pub to_surface: mpsc::UnboundedSender<HostMessage>,
    pub from_surface: mpsc::UnboundedReceiver<SurfaceMessage>,
}

/// Surface's end of the boundary
#[derive(Debug)]
pub struct SurfaceEndpoint {
    pub from_host: mpsc::UnboundedReceiver<HostMessage>,
    pub to_host: mpsc::UnboundedSender<SurfaceMessage>,
}

/// Connected pair of boundary ends
pub fn link() -> (SurfaceLink, SurfaceEndpoint) {
    let (to_surface, from_host) = mpsc::unbounded_channel();
    let (to_host, from_surface) = mpsc::unbounded_channel();
    (
        SurfaceLink {
            to_surface,
            from_surface,
        },
        SurfaceEndpoint { from_host, to_host },
    )
}

/// Turns source text into something elements can be looked up in
pub trait Renderer: Send + 'static {
    /// Transpile and render `source` from scratch; the error is shown to the user
    fn render(&mut self, source: &str) -> Result<(), String>;

    /// Drop whatever is rendered
    fn clear(&mut self);

    fn contains(&self, uid: &str) -> bool;

    /// Resolved style of the rendered element `uid`
    fn resolved_style(&self, uid: &str) -> Option<StyleMap>;
}

/// Renders by parsing the markup; an element's resolved style is its inline style
#[derive(Debug, Default)]
pub struct MarkupRenderer {
    styles: HashMap<String, StyleMap>,
}

impl MarkupRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

struct StyleCollector<'a> {
    styles: &'a mut HashMap<String, StyleMap>,
}

impl Visitor for StyleCollector<'_> {
    fn visit_element(&mut self, element: &Element) {
        if let Some(uid) = element_uid(element) {
            self.styles
                .entry(uid.to_string())
                .or_insert_with(|| inline_style(element).unwrap_or_default());
        }
        walk_element(self, element);
    }
}

impl Renderer for MarkupRenderer {
    fn render(&mut self, source: &str) -> Result<(), String> {
        self.styles.clear();
        let doc = parse(source).map_err(|err| {
            let (line, column) = err.line_col(source);
            format!("{}:{}: {}", line, column, err.message())
        })?;

        StyleCollector {
            styles: &mut self.styles,
        }
        .visit_document(&doc);
        Ok(())
    }

    fn clear(&mut self) {
        self.styles.clear();
    }

    fn contains(&self, uid: &str) -> bool {
        self.styles.contains_key(uid)
    }

    fn resolved_style(&self, uid: &str) -> Option<StyleMap> {
        self.styles.get(uid).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Rendered,
    Failed(String),
}

/// Observable state of a [`LocalSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceStatus {
    pub state: SurfaceState,
    /// Highlighted element, restored across re-renders
    pub highlighted: Option<String>,
    /// Completed render attempts
    pub renders: u64,
}

/// In-process rendering surface running as its own task
pub struct LocalSurface {
    clicks: mpsc::UnboundedSender<String>,
    status: watch::Receiver<SurfaceStatus>,
    task: JoinHandle<()>,
}

impl LocalSurface {
    /// Spawn the surface task. Must be called within a tokio runtime.
    pub fn spawn<R: Renderer>(endpoint: SurfaceEndpoint, renderer: R) -> Self {
        let (clicks, click_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SurfaceStatus {
            state: SurfaceState::Uninitialized,
            highlighted: None,
            renders: 0,
        });

        let task = tokio::spawn(run_surface(endpoint, renderer, click_rx, status_tx));
        Self {
            clicks,
            status,
            task,
        }
    }

    /// Emulate the user clicking the element `uid`
    pub fn click(&self, uid: impl Into<String>) {
        let _ = self.clicks.send(uid.into());
    }

    pub fn status(&self) -> SurfaceStatus {
        self.status.borrow().clone()
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<SurfaceStatus> {
        self.status.clone()
    }
}

impl Drop for LocalSurface {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_surface<R: Renderer>(
    mut endpoint: SurfaceEndpoint,
    mut renderer: R,
    mut clicks: mpsc::UnboundedReceiver<String>,
    status: watch::Sender<SurfaceStatus>,
) {
    loop {
        tokio::select! {
            // User input is handled before later host messages
            biased;

            Some(uid) = clicks.recv() => {
                let rendered = status.borrow().state == SurfaceState::Rendered;
                if !rendered || !renderer.contains(&uid) {
                    tracing::debug!("Click on {} ignored, no such rendered element", uid);
                    continue;
                }
                status.send_modify(|s| s.highlighted = Some(uid.clone()));
                if endpoint.to_host.send(SurfaceMessage::Select { uid }).is_err() {
                    break;
                }
            }
            message = endpoint.from_host.recv() => match message {
                Some(message) => handle_host_message(message, &mut renderer, &endpoint, &status),
                None => break,
            },
        }
    }
    tracing::debug!("Rendering surface stopped");
}

fn handle_host_message<R: Renderer>(
    message: HostMessage,
    renderer: &mut R,
    endpoint: &SurfaceEndpoint,
    status: &watch::Sender<SurfaceStatus>,
) {
    match message {
        HostMessage::Render { source, selected } => {
            status.send_modify(|s| s.state = SurfaceState::Uninitialized);
            renderer.clear();

            match renderer.render(&source) {
                Ok(()) => {
                    let highlighted = selected.filter(|uid| renderer.contains(uid));
                    status.send_modify(|s| {
                        s.state = SurfaceState::Rendered;
                        s.highlighted = highlighted;
                        s.renders += 1;
                    });
                }
                Err(message) => {
                    tracing::warn!("Render failed: {}", message);
                    renderer.clear();
                    status.send_modify(|s| {
                        s.state = SurfaceState::Failed(message.clone());
                        s.highlighted = None;
                        s.renders += 1;
                    });
                    let _ = endpoint.to_host.send(SurfaceMessage::Error { message });
                }
            }
        }
        HostMessage::GetStyle { uid } => {
            match renderer.resolved_style(&uid) {
                Some(styles) => {
                    let _ = endpoint.to_host.send(SurfaceMessage::StyleData { uid, styles });
                }
                // The protocol leaves unknown elements unanswered
                None => tracing::debug!("No rendered element {}, style query left unanswered", uid),
            }
        }
    }
}
