pub mod pdf;

use async_trait::async_trait;

use crate::models::IssuedTicket;

#[async_trait]
pub trait TicketRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    async fn render(&self, issued: &IssuedTicket) -> anyhow::Result<Vec<u8>>;
}
