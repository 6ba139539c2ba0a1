use async_trait::async_trait;

use reqscope_core::error::Result;
use reqscope_core::handler::{Handler, Request, Response};

use super::random_delay;

/// `GET /`: short random pause, always 200.
#[derive(Debug, Default)]
pub struct HomeService;

impl HomeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for HomeService {
    async fn call(&self, _req: Request) -> Result<Response> {
        tokio::time::sleep(random_delay(10, 50)).await;
        Ok(Response::ok("hello from metrics+logs demo\n"))
    }
}
