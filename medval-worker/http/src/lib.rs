//! HTTP boundary of the media validation worker.
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/events` | POST | Process a batch of queue messages carrying storage notifications |
//! | `/health` | GET | Liveness check |

pub mod response;
pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_body_limit, DEFAULT_BODY_LIMIT};
pub use state::AppState;
