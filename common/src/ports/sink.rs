use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SinkError;

/// Stores a device's running configuration, keyed by date and hostname.
#[async_trait]
pub trait ConfigSink: Send + Sync {
    async fn save(&self, hostname: &str, date: NaiveDate, content: &str) -> Result<(), SinkError>;
}
