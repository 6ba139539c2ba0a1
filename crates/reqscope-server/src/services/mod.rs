//! Demo route bodies.
//!
//! Each body only simulates work and picks a status; measurement happens in
//! the instrumentation wrapper they are registered behind.

pub mod fail;
pub mod home;
pub mod work;

use std::time::Duration;

use rand::Rng;

pub use fail::FailService;
pub use home::HomeService;
pub use work::WorkService;

/// Uniform random delay in `[min_ms, max_ms]`.
fn random_delay(min_ms: u64, max_ms: u64) -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}
