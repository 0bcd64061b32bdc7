//! WebSocket bridge to an out-of-process rendering surface.
//!
//! Frames carry the same JSON as the in-process link. One surface can be
//! attached at a time; its endpoint returns to the state on disconnect.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use visedit_preview::{HostMessage, SurfaceEndpoint, SurfaceMessage};

use crate::state::AppState;
use crate::ServerError;

pub(crate) async fn surface_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let endpoint = state.take_endpoint().ok_or(ServerError::SurfaceAttached)?;
    Ok(ws.on_upgrade(move |socket| bridge(socket, endpoint, state)))
}

async fn bridge(socket: WebSocket, mut endpoint: SurfaceEndpoint, state: Arc<AppState>) {
    tracing::info!("Rendering surface attached");

    // Renders queued while detached are stale; queries still want answers
    let mut queued = Vec::new();
    while let Ok(message) = endpoint.from_host.try_recv() {
        if matches!(message, HostMessage::GetStyle { .. }) {
            queued.push(message);
        }
    }

    let (mut sink, mut stream) = socket.split();

    let snapshot = state.snapshot();
    let initial = std::iter::once(HostMessage::Render {
        source: snapshot.source,
        selected: state.host().selected(),
    })
    .chain(queued);

    let mut attached = true;
    for message in initial {
        if send(&mut sink, &message).await.is_err() {
            attached = false;
            break;
        }
    }

    while attached {
        tokio::select! {
            message = endpoint.from_host.recv() => match message {
                Some(message) => {
                    if send(&mut sink, &message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            frame = stream.next() => match frame.map(|frame| frame.map(decode_frame)) {
                Some(Ok(Frame::Message(message))) => {
                    if endpoint.to_host.send(message).is_err() {
                        break;
                    }
                }
                Some(Ok(Frame::Skip)) => {}
                Some(Ok(Frame::Close)) | None => break,
                Some(Err(err)) => {
                    tracing::warn!("Surface socket error: {}", err);
                    break;
                }
            },
        }
    }

    tracing::info!("Rendering surface detached");
    state.restore_endpoint(endpoint);
}

async fn send<S>(sink: &mut S, message: &HostMessage) -> Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
{
    let text = match message.to_json() {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("Failed to encode {:?}: {}", message, err);
            return Ok(());
        }
    };
    sink.send(Message::Text(text)).await.map_err(|_| ())
}

#[derive(Debug, PartialEq)]
enum Frame {
    Message(SurfaceMessage),
    Skip,
    Close,
}

fn decode_frame(frame: Message) -> Frame {
    match frame {
        Message::Text(text) => match SurfaceMessage::from_json(&text) {
            Ok(message) => Frame::Message(message),
            Err(err) => {
                tracing::warn!("Ignoring surface frame: {}", err);
                Frame::Skip
            }
        },
        Message::Close(_) => Frame::Close,
        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => Frame::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_frame() {
        let frame = decode_frame(Message::Text(r#"{"type":"select","uid":"el-3"}"#.to_string()));
        assert_eq!(
            frame,
            Frame::Message(SurfaceMessage::Select {
                uid: "el-3".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_and_control_frames_are_skipped() {
        assert_eq!(decode_frame(Message::Text("not json".to_string())), Frame::Skip);
        assert_eq!(decode_frame(Message::Ping(vec![1])), Frame::Skip);
        assert_eq!(decode_frame(Message::Close(None)), Frame::Close);
    }
}
