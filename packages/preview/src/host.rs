//! # Preview Host
//!
//! Editing-host side of the preview boundary.
//!
//! - Sends full re-renders, each carrying the current selection
//! - Records `select` events as the current selection
//! - Turns `get-style` / `style-data` into an awaitable query
//!
//! Queries are suspend points: each one parks a oneshot sender under the
//! element's identifier until a matching `style-data` arrives. One response
//! resolves every query waiting on that identifier. A surface never answers
//! for an element it doesn't have, so queries carry an optional timeout.

use crate::surface::SurfaceLink;
use crate::{HostMessage, PreviewError, SurfaceMessage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use visedit_common::StyleMap;
use visedit_editor::Document;

/// Default bound on a style query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Surface events forwarded to the host's owner
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewEvent {
    /// The user picked an element on the surface
    Selected(String),
    /// The surface could not render the last source
    RenderFailed(String),
}

type Waiters = HashMap<String, Vec<oneshot::Sender<StyleMap>>>;

#[derive(Default)]
struct Shared {
    selected: Option<String>,
    waiters: Waiters,
}

#[derive(Clone)]
pub struct PreviewHost {
    to_surface: mpsc::UnboundedSender<HostMessage>,
    shared: Arc<Mutex<Shared>>,
    query_timeout: Option<Duration>,
    dispatcher: Arc<DispatchTask>,
}

struct DispatchTask(JoinHandle<()>);

impl Drop for DispatchTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl PreviewHost {
    /// Attach to a surface; `None` waits on style queries indefinitely.
    ///
    /// Returns the host and the stream of surface events. Must be called
    /// within a tokio runtime.
    pub fn connect(
        link: SurfaceLink,
        query_timeout: Option<Duration>,
    ) -> (Self, mpsc::UnboundedReceiver<PreviewEvent>) {
        let SurfaceLink {
            to_surface,
            from_surface,
        } = link;
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (events, event_rx) = mpsc::unbounded_channel();

        let dispatcher = tokio::spawn(dispatch(from_surface, Arc::clone(&shared), events));

        let host = Self {
            to_surface,
            shared,
            query_timeout,
            dispatcher: Arc::new(DispatchTask(dispatcher)),
        };
        (host, event_rx)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Send `source` for a full re-render, restoring the current selection
    pub fn render(&self, source: &str) -> Result<(), PreviewError> {
        let selected = self.selected();
        tracing::debug!("Render {} bytes (selected: {:?})", source.len(), selected);
        self.send(HostMessage::Render {
            source: source.to_string(),
            selected,
        })
    }

    /// Resolved style of `uid` as reported by the surface
    pub async fn query_style(&self, uid: &str) -> Result<StyleMap, PreviewError> {
        let (tx, rx) = oneshot::channel();
        lock(&self.shared)
            .waiters
            .entry(uid.to_string())
            .or_default()
            .push(tx);

        if let Err(err) = self.send(HostMessage::GetStyle {
            uid: uid.to_string(),
        }) {
            self.prune_waiters(uid);
            return Err(err);
        }

        let answer = match self.query_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, rx).await {
                Ok(answer) => answer,
                Err(_) => {
                    self.prune_waiters(uid);
                    tracing::warn!("Style query for {} timed out", uid);
                    return Err(PreviewError::QueryTimeout {
                        uid: uid.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            },
            None => rx.await,
        };

        answer.map_err(|_| PreviewError::Disconnected)
    }

    pub fn selected(&self) -> Option<String> {
        lock(&self.shared).selected.clone()
    }

    /// Override the selection sent with the next render
    pub fn set_selected(&self, uid: Option<String>) {
        lock(&self.shared).selected = uid;
    }

    /// Number of queries still waiting for an answer
    pub fn pending_queries(&self) -> usize {
        lock(&self.shared).waiters.values().map(Vec::len).sum()
    }

    fn send(&self, message: HostMessage) -> Result<(), PreviewError> {
        self.to_surface
            .send(message)
            .map_err(|_| PreviewError::Disconnected)
    }

    fn prune_waiters(&self, uid: &str) {
        let mut shared = lock(&self.shared);
        if let Some(waiters) = shared.waiters.get_mut(uid) {
            waiters.retain(|tx| !tx.is_closed());
            if waiters.is_empty() {
                shared.waiters.remove(uid);
            }
        }
    }
}

async fn dispatch(
    mut from_surface: mpsc::UnboundedReceiver<SurfaceMessage>,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<PreviewEvent>,
) {
    while let Some(message) = from_surface.recv().await {
        match message {
            SurfaceMessage::Select { uid } => {
                tracing::debug!("Surface selected {}", uid);
                lock(&shared).selected = Some(uid.clone());
                let _ = events.send(PreviewEvent::Selected(uid));
            }
            SurfaceMessage::Error { message } => {
                tracing::warn!("Surface failed to render: {}", message);
                let _ = events.send(PreviewEvent::RenderFailed(message));
            }
            SurfaceMessage::StyleData { uid, styles } => {
                let waiters = lock(&shared).waiters.remove(&uid).unwrap_or_default();
                if waiters.is_empty() {
                    tracing::debug!("Unsolicited style data for {}", uid);
                }
                for waiter in waiters {
                    let _ = waiter.send(styles.clone());
                }
            }
        }
    }

    // Surface gone: dropping the senders fails every outstanding query
    lock(&shared).waiters.clear();
    tracing::debug!("Surface link closed");
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolved style of `uid`, or `None` when the document has no such element
pub async fn style_snapshot(
    document: &Document,
    host: &PreviewHost,
    uid: &str,
) -> Result<Option<StyleMap>, PreviewError> {
    if !document.contains(uid) {
        return Ok(None);
    }
    host.query_style(uid).await.map(Some)
}
