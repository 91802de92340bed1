//! WQC Client: from user input to a presented result
//!
//! Validates console input into a [`QueryRequest`](wqc_core::QueryRequest),
//! routes it to the backend path for its mode, and runs each query cycle
//! (send, classify, extract, present) inside a [`QuerySession`].
//! [`HealthMonitor`] keeps a live online/offline status alongside.

pub mod config;
pub mod health;
pub mod request;
pub mod session;
pub mod transport;

pub use config::ConsoleConfig;
pub use health::{HealthMonitor, ServerStatus};
pub use request::{hybrid, parse_input, route, DslTemplate, EndpointLayout, OutboundRequest};
pub use session::{QueryOutcome, QuerySession};
pub use transport::{HttpTransport, Transport};
