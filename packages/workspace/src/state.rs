//! Shared server state: the edit session, its coalescer and the preview host.
//!
//! Every mutating path goes through the session mutex, which is never held
//! across an await.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use visedit_editor::{
    ApplyFn, Document, EditCoalescer, EditSession, ElementUpdate, MutationResult, NodePreview, PendingUpdate,
    DEFAULT_QUIESCENCE,
};
use visedit_preview::{
    link, LocalSurface, MarkupRenderer, PreviewEvent, PreviewHost, SurfaceEndpoint, DEFAULT_QUERY_TIMEOUT,
};

use crate::ServerError;

/// Where the rendering surface lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    /// In-process surface; `/ws` is unavailable
    Local,
    /// A browser attaches over `/ws`
    Remote,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub quiescence: Duration,
    pub query_timeout: Option<Duration>,
    pub surface: SurfaceMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            quiescence: DEFAULT_QUIESCENCE,
            query_timeout: Some(DEFAULT_QUERY_TIMEOUT),
            surface: SurfaceMode::Local,
        }
    }
}

/// `GET /api/document` payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub source: String,
    pub version: u64,
    pub selected: Option<String>,
    pub last_error: Option<String>,
}

pub struct AppState {
    session: Arc<Mutex<EditSession>>,
    coalescer: EditCoalescer,
    host: PreviewHost,
    /// Surface end waiting for a browser; taken while one is attached
    endpoint: Mutex<Option<SurfaceEndpoint>>,
    local: Option<LocalSurface>,
    events: JoinHandle<()>,
}

impl AppState {
    /// Wire up a session for `document`. Must be called within a tokio runtime.
    pub fn new(document: Document, config: &ServerConfig) -> Arc<Self> {
        let session = Arc::new(Mutex::new(EditSession::new(document)));

        let (host_end, surface_end) = link();
        let (host, events) = PreviewHost::connect(host_end, config.query_timeout);

        let (endpoint, local) = match config.surface {
            SurfaceMode::Local => (None, Some(LocalSurface::spawn(surface_end, MarkupRenderer::new()))),
            SurfaceMode::Remote => (Some(surface_end), None),
        };

        let coalescer = EditCoalescer::new(config.quiescence, apply_fn(&session, &host));
        let events = tokio::spawn(forward_events(events, Arc::clone(&session), host.clone()));

        let state = Arc::new(Self {
            session,
            coalescer,
            host,
            endpoint: Mutex::new(endpoint),
            local,
            events,
        });
        state.render();
        state
    }

    pub fn host(&self) -> &PreviewHost {
        &self.host
    }

    pub fn local_surface(&self) -> Option<&LocalSurface> {
        self.local.as_ref()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        let session = lock(&self.session);
        DocumentSnapshot {
            source: session.source().to_string(),
            version: session.document().version(),
            selected: session.selected().map(String::from),
            last_error: session.last_error().map(String::from),
        }
    }

    /// Replace the text wholesale; the previous document stays on failure
    pub fn replace_source(&self, source: String) -> Result<DocumentSnapshot, ServerError> {
        {
            let mut session = lock(&self.session);
            if let Err(err) = session.set_source(source.clone()) {
                return Err(ServerError::from_editor(err, &source));
            }
        }

        // A pending edit addresses the replaced text
        if self.coalescer.cancel() {
            tracing::debug!("Dropped pending update superseded by source replacement");
        }
        self.host.set_selected(None);
        self.render();
        Ok(self.snapshot())
    }

    /// Queue an update through the coalescer
    pub fn schedule_update(&self, uid: String, update: ElementUpdate) {
        tracing::debug!("Scheduled update for {}", uid);
        self.coalescer.schedule(uid, update);
    }

    /// Apply any pending update now
    pub fn flush(&self) -> bool {
        self.coalescer.flush()
    }

    pub fn node_preview(&self, uid: &str) -> Option<NodePreview> {
        lock(&self.session).node_preview(uid)
    }

    /// Send the current text to the surface
    pub fn render(&self) {
        let source = lock(&self.session).source().to_string();
        if let Err(err) = self.host.render(&source) {
            tracing::warn!("Failed to send render: {}", err);
        }
    }

    pub(crate) fn take_endpoint(&self) -> Option<SurfaceEndpoint> {
        lock(&self.endpoint).take()
    }

    pub(crate) fn restore_endpoint(&self, endpoint: SurfaceEndpoint) {
        *lock(&self.endpoint) = Some(endpoint);
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.events.abort();
    }
}

fn apply_fn(session: &Arc<Mutex<EditSession>>, host: &PreviewHost) -> ApplyFn {
    let session = Arc::clone(session);
    let host = host.clone();

    Arc::new(move |pending: PendingUpdate| {
        let mut session = lock(&session);
        match session.apply_update(&pending.uid, &pending.update) {
            Ok(MutationResult::Applied { version }) => {
                tracing::info!("Applied update to {} (version {})", pending.uid, version);
                host.set_selected(session.selected().map(String::from));
                if let Err(err) = host.render(session.source()) {
                    tracing::warn!("Failed to send render: {}", err);
                }
            }
            Ok(MutationResult::Noop { reason }) => {
                tracing::debug!("Update for {} not applied: {}", pending.uid, reason);
            }
            Err(err) => {
                tracing::warn!("Update for {} rejected: {}", pending.uid, err);
            }
        }
    })
}

async fn forward_events(
    mut events: mpsc::UnboundedReceiver<PreviewEvent>,
    session: Arc<Mutex<EditSession>>,
    host: PreviewHost,
) {
    while let Some(event) = events.recv().await {
        let mut session = lock(&session);
        match event {
            PreviewEvent::Selected(uid) => {
                if !session.select(&uid) {
                    host.set_selected(session.selected().map(String::from));
                }
            }
            PreviewEvent::RenderFailed(message) => session.report_error(message),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
