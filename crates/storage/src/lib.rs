pub mod db;
pub mod store;

pub use db::{
    category_counts, count_messages, count_senders, create_db, create_db_at, daily_counts,
    daily_volume, get_recipient_name, insert_message, list_messages, statistics, top_recipients,
    top_senders, DbPool, MessageFilter, MessagePage, PageRequest, Statistics, StorageError,
    DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use store::SqliteMessageStore;
