//! # Visedit Workspace
//!
//! Designer server around one [`EditSession`](visedit_editor::EditSession).
//!
//! ```text
//! browser UI ──HTTP──→ router ──→ coalescer ──→ session (mutex)
//!                                                  │ re-print
//! surface ←──/ws or in-process link──── preview host
//! ```

mod bridge;
mod errors;
mod server;
mod state;

pub use errors::ServerError;
pub use server::{router, serve, ElementResponse};
pub use state::{AppState, DocumentSnapshot, ServerConfig, SurfaceMode};
