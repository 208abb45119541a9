//! Transport and process wiring (A4/A5): the WebSocket protocol, the HTTP
//! router, the session registry and the shared application state that ties
//! the alignment core and the ASR/decoder pipeline to the outside world.

pub mod error;
pub mod http;
pub mod reference_loader;
pub mod session_manager;
pub mod state;
pub mod websocket;

pub use error::ServerError;
pub use http::create_router;
pub use reference_loader::load_reference_index;
pub use session_manager::{ManagedSession, SessionManager};
pub use state::AppState;
