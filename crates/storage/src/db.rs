use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use momo_core::{Category, Money, NewMessage, StoredMessage};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

/// Timestamps are stored as sortable UTC text so `date()` and range
/// comparisons work directly in SQL.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid stored timestamp: '{0}'")]
    InvalidTimestamp(String),
}

pub async fn create_db(url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;
    tracing::debug!("Database schema ready");

    Ok(pool)
}

pub async fn create_db_at(path: &Path) -> Result<DbPool, sqlx::Error> {
    create_db(&format!("sqlite://{}", path.display())).await
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS senders (
            sender_id INTEGER PRIMARY KEY AUTOINCREMENT,
            phone_number TEXT NOT NULL UNIQUE,
            name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipients (
            recipient_id INTEGER PRIMARY KEY AUTOINCREMENT,
            phone_number TEXT NOT NULL UNIQUE,
            name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            message_id INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id INTEGER,
            recipient_id INTEGER,
            timestamp TEXT NOT NULL,
            message_body TEXT NOT NULL,
            category TEXT,
            amount_cents INTEGER,
            currency TEXT,
            status TEXT,
            new_balance_cents INTEGER,
            fee_cents INTEGER,
            transaction_id TEXT,
            recipient_name TEXT,
            FOREIGN KEY (sender_id) REFERENCES senders(sender_id),
            FOREIGN KEY (recipient_id) REFERENCES recipients(recipient_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_category ON messages(category)")
        .execute(pool)
        .await?;

    Ok(())
}

// ── Writes ────────────────────────────────────────────────────────────────────

/// Stores a classified message together with its sender and (if a phone
/// number was extracted) its recipient, all in one transaction.
pub async fn insert_message(pool: &DbPool, message: &NewMessage) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let sender_id = upsert_sender(&mut tx, &message.sender_phone).await?;
    let fields = &message.fields;
    let recipient_id = match fields.recipient_phone.as_deref() {
        Some(phone) => Some(upsert_recipient(&mut tx, phone, fields.recipient_name.as_deref()).await?),
        None => None,
    };

    let (message_id,) = sqlx::query_as::<_, (i64,)>(
        "INSERT INTO messages (sender_id, recipient_id, timestamp, message_body, category, amount_cents, currency, status, new_balance_cents, fee_cents, transaction_id, recipient_name) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING message_id"
    )
    .bind(sender_id)
    .bind(recipient_id)
    .bind(format_timestamp(message.timestamp))
    .bind(message.body.as_str())
    .bind(message.category.label())
    .bind(fields.amount.map(Money::to_cents))
    .bind(fields.currency().map(|c| c.code()))
    .bind(message.status.to_string())
    .bind(fields.new_balance.map(Money::to_cents))
    .bind(fields.fee.map(Money::to_cents))
    .bind(fields.transaction_id.as_deref())
    .bind(fields.recipient_name.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(message_id)
}

async fn upsert_sender(conn: &mut SqliteConnection, phone: &str) -> Result<i64, sqlx::Error> {
    let (id,) = sqlx::query_as::<_, (i64,)>(
        "INSERT INTO senders (phone_number) VALUES (?) ON CONFLICT(phone_number) DO UPDATE SET phone_number = excluded.phone_number RETURNING sender_id"
    )
    .bind(phone)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// The first name seen for a phone number sticks; a later one only fills a gap.
async fn upsert_recipient(
    conn: &mut SqliteConnection,
    phone: &str,
    name: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let (id,) = sqlx::query_as::<_, (i64,)>(
        "INSERT INTO recipients (phone_number, name) VALUES (?, ?) ON CONFLICT(phone_number) DO UPDATE SET name = COALESCE(recipients.name, excluded.name) RETURNING recipient_id"
    )
    .bind(phone)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

// ── Lookups ───────────────────────────────────────────────────────────────────

pub async fn count_messages(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
        .fetch_one(pool)
        .await
}

pub async fn count_senders(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM senders")
        .fetch_one(pool)
        .await
}

pub async fn get_recipient_name(pool: &DbPool, phone: &str) -> Result<Option<Option<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>("SELECT name FROM recipients WHERE phone_number = ?")
        .bind(phone)
        .fetch_optional(pool)
        .await
}

// ── Filtered listing ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Inclusive first day.
    pub start_date: Option<NaiveDate>,
    /// Inclusive last day.
    pub end_date: Option<NaiveDate>,
    /// Category label; "All Categories" (any case) disables the filter.
    pub category: Option<String>,
    /// Case-insensitive substring of the message body.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Out-of-range values are clamped rather than rejected.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let per_page = per_page
            .unwrap_or(DEFAULT_PER_PAGE as i64)
            .clamp(1, MAX_PER_PAGE as i64) as u32;
        PageRequest { page, per_page }
    }

    fn offset(self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

#[derive(Debug, Clone)]
pub struct MessagePage {
    pub messages: Vec<StoredMessage>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl MessagePage {
    pub fn total_pages(&self) -> i64 {
        let per_page = self.per_page as i64;
        (self.total + per_page - 1) / per_page
    }
}

type MessageRow = (
    i64,
    Option<String>,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

/// Newest first.
pub async fn list_messages(
    pool: &DbPool,
    filter: &MessageFilter,
    page: PageRequest,
) -> Result<MessagePage, StorageError> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM messages m WHERE 1 = 1");
    push_filters(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new(
        "SELECT m.message_id, s.phone_number, r.phone_number, m.timestamp, m.message_body, m.category, m.amount_cents, m.currency, m.status, m.new_balance_cents, m.fee_cents, m.transaction_id, m.recipient_name \
         FROM messages m \
         LEFT JOIN senders s ON s.sender_id = m.sender_id \
         LEFT JOIN recipients r ON r.recipient_id = m.recipient_id \
         WHERE 1 = 1",
    );
    push_filters(&mut select, filter);
    select
        .push(" ORDER BY m.timestamp DESC, m.message_id DESC LIMIT ")
        .push_bind(page.per_page as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = select.build_query_as::<MessageRow>().fetch_all(pool).await?;
    let messages = rows
        .into_iter()
        .map(row_to_message)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MessagePage {
        messages,
        total,
        page: page.page,
        per_page: page.per_page,
    })
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MessageFilter) {
    if let Some(start) = filter.start_date {
        qb.push(" AND m.timestamp >= ")
            .push_bind(format_timestamp(start_of_day(start)));
    }
    if let Some(end) = filter.end_date {
        // Half-open bound on the following midnight keeps the whole last day.
        if let Some(next) = end.checked_add_days(Days::new(1)) {
            qb.push(" AND m.timestamp < ")
                .push_bind(format_timestamp(start_of_day(next)));
        }
    }
    if let Some(category) = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all categories"))
    {
        qb.push(" AND m.category = ")
            .push_bind(category.to_string())
            .push(" COLLATE NOCASE");
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.is_empty()) {
        qb.push(" AND m.message_body LIKE '%' || ")
            .push_bind(term.to_string())
            .push(" || '%'");
    }
}

fn row_to_message(r: MessageRow) -> Result<StoredMessage, StorageError> {
    Ok(StoredMessage {
        message_id: r.0,
        sender_phone: r.1,
        recipient_phone: r.2,
        timestamp: parse_timestamp(&r.3)?,
        message_body: r.4,
        category: r.5,
        amount: r.6.map(Money::from_cents),
        currency: r.7,
        status: r.8,
        new_balance: r.9.map(Money::from_cents),
        fee: r.10.map(Money::from_cents),
        transaction_id: r.11,
        recipient_name: r.12,
    })
}

// ── Aggregates ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub total_messages: i64,
    /// Messages that carry an amount.
    pub total_transactions: i64,
    pub total_volume: Money,
}

impl Statistics {
    pub fn avg_transaction(&self) -> f64 {
        if self.total_transactions == 0 {
            return 0.0;
        }
        self.total_volume.to_f64() / self.total_transactions as f64
    }
}

pub async fn statistics(pool: &DbPool) -> Result<Statistics, sqlx::Error> {
    let (total_messages, total_transactions, volume_cents) = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT COUNT(*), COUNT(amount_cents), COALESCE(SUM(amount_cents), 0) FROM messages",
    )
    .fetch_one(pool)
    .await?;

    Ok(Statistics {
        total_messages,
        total_transactions,
        total_volume: Money::from_cents(volume_cents),
    })
}

pub async fn category_counts(pool: &DbPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT category, COUNT(*) FROM messages WHERE category IS NOT NULL GROUP BY category ORDER BY category",
    )
    .fetch_all(pool)
    .await
}

pub async fn daily_counts(pool: &DbPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT date(timestamp) AS day, COUNT(*) FROM messages GROUP BY day HAVING day IS NOT NULL ORDER BY day",
    )
    .fetch_all(pool)
    .await
}

/// Summed amounts per day, ignoring messages without an amount.
pub async fn daily_volume(pool: &DbPool) -> Result<Vec<(String, Money)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT date(timestamp) AS day, SUM(amount_cents) FROM messages WHERE amount_cents IS NOT NULL GROUP BY day HAVING day IS NOT NULL ORDER BY day",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(day, cents)| (day, Money::from_cents(cents))).collect())
}

/// Names with the largest summed amount, descending.
pub async fn top_recipients(pool: &DbPool, limit: u32) -> Result<Vec<(String, Money)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT recipient_name, SUM(amount_cents) AS total FROM messages WHERE recipient_name IS NOT NULL AND amount_cents IS NOT NULL GROUP BY recipient_name ORDER BY total DESC, recipient_name LIMIT ?",
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name, cents)| (name, Money::from_cents(cents))).collect())
}

/// For incoming money the extracted name is the counterparty who sent it.
pub async fn top_senders(pool: &DbPool, limit: u32) -> Result<Vec<(String, Money)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT recipient_name, SUM(amount_cents) AS total FROM messages WHERE category = ? AND recipient_name IS NOT NULL AND amount_cents IS NOT NULL GROUP BY recipient_name ORDER BY total DESC, recipient_name LIMIT ?",
    )
    .bind(Category::IncomingMoney.label())
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name, cents)| (name, Money::from_cents(cents))).collect())
}

// ── Timestamp helpers ─────────────────────────────────────────────────────────

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| StorageError::InvalidTimestamp(raw.to_string()))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
