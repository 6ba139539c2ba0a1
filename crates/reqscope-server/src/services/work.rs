use std::time::Duration;

use async_trait::async_trait;

use reqscope_core::error::{ReqScopeError, Result};
use reqscope_core::handler::{Handler, Request, Response};

use crate::config::DemoSection;

/// `GET /work?ms=N`: sleeps N milliseconds.
///
/// A non-numeric `ms` is a body fault (the wrapper answers 500 and records it
/// as `unhandled`); a value above `max_ms` is refused with a plain 400.
#[derive(Debug)]
pub struct WorkService {
    default_ms: u64,
    max_ms: u64,
}

impl WorkService {
    pub fn new(cfg: &DemoSection) -> Self {
        Self {
            default_ms: cfg.default_work_ms,
            max_ms: cfg.max_work_ms,
        }
    }
}

#[async_trait]
impl Handler for WorkService {
    async fn call(&self, req: Request) -> Result<Response> {
        let ms = match req.query_param("ms") {
            None => self.default_ms,
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ReqScopeError::BadRequest(format!("ms must be a non-negative integer, got {raw:?}"))
            })?,
        };
        if ms > self.max_ms {
            return Ok(Response::new(400, format!("ms must be at most {}\n", self.max_ms)));
        }

        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(Response::ok(format!("did work for {ms}ms\n")))
    }
}
