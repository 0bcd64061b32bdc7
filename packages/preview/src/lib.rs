//! # Visedit Preview
//!
//! The message boundary between the editing host and an isolated rendering
//! surface. The surface receives source text and reports back by element
//! identifier; nothing crosses the boundary by reference.

mod errors;
mod host;
mod protocol;
pub mod surface;

pub use errors::PreviewError;
pub use host::{style_snapshot, PreviewEvent, PreviewHost, DEFAULT_QUERY_TIMEOUT};
pub use protocol::{HostMessage, SurfaceMessage};
pub use surface::{link, LocalSurface, MarkupRenderer, Renderer, SurfaceEndpoint, SurfaceLink, SurfaceState, SurfaceStatus};
