use async_trait::async_trait;

use reqscope_core::error::Result;
use reqscope_core::handler::{Handler, Request, Response};

use super::random_delay;

/// `GET /fail`: short random pause, always 500.
#[derive(Debug, Default)]
pub struct FailService;

impl FailService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for FailService {
    async fn call(&self, _req: Request) -> Result<Response> {
        tokio::time::sleep(random_delay(10, 30)).await;
        Ok(Response::new(500, "simulated failure\n"))
    }
}
