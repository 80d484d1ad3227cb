use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use super::category::Category;
use super::money::Money;
use super::transaction::TransactionFields;

/// One `<sms>` entry from a backup export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsRecord {
    pub address: String,
    pub date_ms: i64,
    pub body: String,
}

impl SmsRecord {
    /// Milliseconds since the epoch as a UTC timestamp. `None` when out of range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStatus {
    #[default]
    Completed,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A classified message ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_phone: String,
    pub timestamp: DateTime<Utc>,
    pub body: String,
    pub category: Category,
    pub fields: TransactionFields,
    pub status: MessageStatus,
}

/// A persisted message as read back for listing.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub message_id: i64,
    pub sender_phone: Option<String>,
    pub recipient_phone: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message_body: String,
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub new_balance: Option<Money>,
    pub fee: Option<Money>,
    pub transaction_id: Option<String>,
    pub recipient_name: Option<String>,
}

/// Destination for classified messages during a batch import.
#[async_trait]
pub trait MessageStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist one message with its sender and recipient. Returns the new message id.
    async fn store(&self, message: &NewMessage) -> Result<i64, Self::Error>;
}
