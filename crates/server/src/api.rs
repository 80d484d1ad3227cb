//! JSON handlers mounted under `/api/v1`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use momo_core::{Category, Money, StoredMessage, TransactionFields};
use momo_storage::{MessageFilter, PageRequest};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

const DEFAULT_TOP_LIMIT: u32 = 5;
const MAX_TOP_LIMIT: u32 = 100;

fn money(value: Option<Money>) -> Option<f64> {
    value.map(Money::to_f64)
}

/// Blank query values behave as if the parameter were absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Integer query values that do not parse fall back to the default.
fn lenient_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn parse_day(value: Option<String>, param: &str) -> Result<Option<NaiveDate>, AppError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("Invalid {param} format. Use YYYY-MM-DD."))),
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub message_id: i64,
    pub sender_phone: Option<String>,
    pub recipient_phone: Option<String>,
    pub timestamp: String,
    pub message_body: String,
    pub category: Option<String>,
    pub transaction_amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub new_balance: Option<f64>,
    pub fee: Option<f64>,
    pub transaction_id: Option<String>,
    pub recipient_name: Option<String>,
}

impl From<StoredMessage> for MessageView {
    fn from(m: StoredMessage) -> Self {
        MessageView {
            message_id: m.message_id,
            sender_phone: m.sender_phone,
            recipient_phone: m.recipient_phone,
            timestamp: m.timestamp.to_rfc3339(),
            message_body: m.message_body,
            category: m.category,
            transaction_amount: money(m.amount),
            currency: m.currency,
            status: m.status,
            new_balance: money(m.new_balance),
            fee: money(m.fee),
            transaction_id: m.transaction_id,
            recipient_name: m.recipient_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageView>,
    pub total_messages: i64,
    pub total_pages: i64,
    pub current_page: u32,
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagesResponse>, AppError> {
    let filter = MessageFilter {
        start_date: parse_day(query.start_date, "start_date")?,
        end_date: parse_day(query.end_date, "end_date")?,
        category: non_blank(query.category),
        search: non_blank(query.search),
    };
    let page = PageRequest::new(
        lenient_int(query.page.as_deref()),
        lenient_int(query.per_page.as_deref()),
    );

    let result = momo_storage::list_messages(&state.db, &filter, page).await?;
    let total_pages = result.total_pages();

    Ok(Json(MessagesResponse {
        messages: result.messages.into_iter().map(MessageView::from).collect(),
        total_messages: result.total,
        total_pages,
        current_page: result.page,
    }))
}

// ── Aggregates ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub total_messages: i64,
    pub total_transactions: i64,
    pub total_volume: f64,
    pub avg_transaction: f64,
}

pub async fn statistics(State(state): State<Arc<AppState>>) -> Result<Json<StatisticsResponse>, AppError> {
    let stats = momo_storage::statistics(&state.db).await?;
    Ok(Json(StatisticsResponse {
        total_messages: stats.total_messages,
        total_transactions: stats.total_transactions,
        total_volume: stats.total_volume.to_f64(),
        avg_transaction: stats.avg_transaction(),
    }))
}

pub async fn categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, i64>>, AppError> {
    let counts = momo_storage::category_counts(&state.db).await?;
    Ok(Json(counts.into_iter().collect()))
}

pub async fn daily_trends(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, i64>>, AppError> {
    let counts = momo_storage::daily_counts(&state.db).await?;
    Ok(Json(counts.into_iter().collect()))
}

pub async fn daily_volume(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, f64>>, AppError> {
    let volume = momo_storage::daily_volume(&state.db).await?;
    Ok(Json(
        volume
            .into_iter()
            .map(|(day, total)| (day, total.to_f64()))
            .collect(),
    ))
}

// ── Rankings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub limit: Option<String>,
}

impl TopQuery {
    fn limit(&self) -> u32 {
        lenient_int(self.limit.as_deref())
            .unwrap_or(DEFAULT_TOP_LIMIT as i64)
            .clamp(1, MAX_TOP_LIMIT as i64) as u32
    }
}

/// Name to total, serialized as a JSON object whose keys keep rank order.
#[derive(Debug)]
pub struct Ranking(Vec<(String, f64)>);

impl From<Vec<(String, Money)>> for Ranking {
    fn from(rows: Vec<(String, Money)>) -> Self {
        Ranking(
            rows.into_iter()
                .map(|(name, total)| (name, total.to_f64()))
                .collect(),
        )
    }
}

impl Serialize for Ranking {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, total)| (name, total)))
    }
}

pub async fn top_recipients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Ranking>, AppError> {
    let rows = momo_storage::top_recipients(&state.db, query.limit()).await?;
    Ok(Json(rows.into()))
}

pub async fn top_senders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Ranking>, AppError> {
    let rows = momo_storage::top_senders(&state.db, query.limit()).await?;
    Ok(Json(rows.into()))
}

// ── Classification ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct FieldsView {
    pub amount: Option<f64>,
    pub currency: Option<&'static str>,
    pub new_balance: Option<f64>,
    pub fee: Option<f64>,
    pub transaction_id: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
}

impl From<TransactionFields> for FieldsView {
    fn from(f: TransactionFields) -> Self {
        FieldsView {
            currency: f.currency().map(|c| c.code()),
            amount: money(f.amount),
            new_balance: money(f.new_balance),
            fee: money(f.fee),
            transaction_id: f.transaction_id,
            recipient_name: f.recipient_name,
            recipient_phone: f.recipient_phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: Category,
    pub fields: FieldsView,
}

pub async fn classify(Json(req): Json<ClassifyRequest>) -> Json<ClassifyResponse> {
    let (category, fields) = momo_extract::classify(&req.body);
    Json(ClassifyResponse {
        category,
        fields: fields.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_dates_are_ignored() {
        assert_eq!(parse_day(None, "start_date").unwrap(), None);
        assert_eq!(parse_day(Some("  ".into()), "start_date").unwrap(), None);
    }

    #[test]
    fn bad_date_names_the_parameter() {
        let err = parse_day(Some("19/10/2026".into()), "end_date").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid end_date format. Use YYYY-MM-DD.");
    }

    #[test]
    fn top_limit_defaults_and_clamps() {
        let limit = |v: Option<&str>| TopQuery { limit: v.map(str::to_string) }.limit();
        assert_eq!(limit(None), 5);
        assert_eq!(limit(Some("0")), 1);
        assert_eq!(limit(Some("-1")), 1);
        assert_eq!(limit(Some("5000")), 100);
        assert_eq!(limit(Some("ten")), 5);
    }

    #[test]
    fn unparseable_integers_fall_back() {
        assert_eq!(lenient_int(Some(" 3 ")), Some(3));
        assert_eq!(lenient_int(Some("abc")), None);
        assert_eq!(lenient_int(Some("")), None);
        assert_eq!(lenient_int(None), None);
    }

    #[test]
    fn ranking_keeps_rank_order_as_object_keys() {
        let ranking = Ranking::from(vec![
            ("Zed".to_string(), Money::from_cents(900_000)),
            ("Amy".to_string(), Money::from_cents(150_050)),
        ]);
        assert_eq!(
            serde_json::to_string(&ranking).unwrap(),
            r#"{"Zed":9000.0,"Amy":1500.5}"#
        );
    }

    #[test]
    fn fields_view_reports_currency_with_amount() {
        let (_, fields) = momo_extract::classify("You have received 1,000 RWF from Jane Doe");
        let view = FieldsView::from(fields);
        assert_eq!(view.amount, Some(1000.0));
        assert_eq!(view.currency, Some("RWF"));

        let view = FieldsView::from(TransactionFields::default());
        assert_eq!(view.amount, None);
        assert_eq!(view.currency, None);
    }
}
