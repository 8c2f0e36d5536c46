//! HTTP API for the tally vote recorder.
//!
//! Provides endpoints for:
//! - Casting a vote on a project (`POST /api/projects/{projectId}/vote`)
//! - Liveness (`GET /health`)
//! - Prometheus metrics (`GET /metrics`)

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::{error_body, RpcError};
pub use metrics::RpcMetrics;
pub use server::{router, RpcServer, RpcState};
