//! HTTP surface of the Hoover bot: axum server, bearer auth, and the
//! message endpoints that run one turn per request.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod transport;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
pub use transport::ChannelTransport;
