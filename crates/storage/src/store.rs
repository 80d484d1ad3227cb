use async_trait::async_trait;
use momo_core::{MessageStore, NewMessage};
use tracing::debug;

use crate::db::{insert_message, DbPool};

/// [`MessageStore`] backed by the SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteMessageStore {
    pool: DbPool,
}

impl SqliteMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    type Error = sqlx::Error;

    async fn store(&self, message: &NewMessage) -> Result<i64, Self::Error> {
        let id = insert_message(&self.pool, message).await?;
        debug!(message_id = id, category = %message.category, "Stored message");
        Ok(id)
    }
}
