//! reqscope server library entry.
//!
//! Wires config, the instrumented route table, and the operational endpoints
//! into an axum `Router`. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod ops;
pub mod router;
pub mod services;
pub mod transport;
