use std::path::Path;

use momo_core::{MessageStatus, MessageStore, NewMessage, SmsRecord};
use momo_extract::Extractor;
use thiserror::Error;
use tracing::{info, warn};

use crate::sms_backup::{parse_backup, ImportError};

/// Log a progress line every this many stored messages.
pub const PROGRESS_INTERVAL: usize = 100;

/// Why one message was skipped. Never aborts the batch.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("message from '{address}': timestamp {date_ms} is out of range")]
    TimestampOutOfRange { address: String, date_ms: i64 },
    #[error("message from '{address}' could not be stored: {source}")]
    Store {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Classifies SMS records and hands them to a [`MessageStore`] one at a time.
pub struct BatchLoader<'a, S: MessageStore> {
    store: &'a S,
}

impl<'a, S: MessageStore> BatchLoader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn load<I>(&self, records: I) -> ImportSummary
    where
        I: IntoIterator<Item = SmsRecord>,
    {
        let mut summary = ImportSummary::default();

        for record in records {
            match self.load_one(record).await {
                Ok(_) => {
                    summary.processed += 1;
                    if summary.processed % PROGRESS_INTERVAL == 0 {
                        info!(processed = summary.processed, "Processed messages");
                    }
                }
                Err(e) => {
                    warn!("Skipping SMS: {e}");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            "Finished storing messages"
        );
        summary
    }

    /// Classify and store a single record, returning the new message id.
    pub async fn load_one(&self, record: SmsRecord) -> Result<i64, LoadError> {
        let timestamp = record.timestamp().ok_or_else(|| LoadError::TimestampOutOfRange {
            address: record.address.clone(),
            date_ms: record.date_ms,
        })?;
        let (category, fields) = Extractor::classify(&record.body);

        let message = NewMessage {
            sender_phone: record.address,
            timestamp,
            body: record.body,
            category,
            fields,
            status: MessageStatus::Completed,
        };

        self.store
            .store(&message)
            .await
            .map_err(|e| LoadError::Store {
                address: message.sender_phone.clone(),
                source: Box::new(e),
            })
    }
}

/// Read a backup file, classify every message and store it.
/// Elements rejected by the parser count as skipped.
pub async fn load_file<S: MessageStore>(path: &Path, store: &S) -> Result<ImportSummary, ImportError> {
    info!("Parsing SMS backup: {}", path.display());
    let xml = tokio::fs::read_to_string(path).await?;
    let parsed = parse_backup(&xml)?;

    for rejected in &parsed.rejected {
        warn!("Skipping SMS: {rejected}");
    }

    let mut summary = BatchLoader::new(store).load(parsed.records).await;
    summary.skipped += parsed.rejected.len();
    Ok(summary)
}
