use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use walker_core::cache::RecordCache;
use walker_core::config::ClientConfig;
use walker_core::db::{KeyValueStore, LibSqlKeyValueStore};
use walker_core::merge::DisplayRecord;
use walker_core::models::{Cart, CartLine};
use walker_core::remote::HttpRemoteStore;
use walker_core::services::StorefrontService;
use walker_core::sync::SyncReport;
use walker_core::{LocalId, Payload, Purchase, Record, Sneaker};

use crate::error::CliError;

pub type Service = StorefrontService<LibSqlKeyValueStore, HttpRemoteStore>;

#[derive(Debug, Serialize)]
pub struct SneakerListItem {
    pub id: Option<String>,
    pub local_id: Option<String>,
    pub name: String,
    pub price: f64,
    pub qty: i64,
    pub desc: String,
    pub image: Option<String>,
    pub pending: bool,
}

#[derive(Debug, Serialize)]
pub struct PendingItem {
    pub local_id: String,
    pub created_at: i64,
    pub relative_time: String,
    pub summary: String,
    pub payload: serde_json::Value,
}

/// One-line description of a record payload for terminal output.
pub trait Summary {
    fn summary(&self) -> String;
}

impl Summary for Sneaker {
    fn summary(&self) -> String {
        format!("{} {} x{}", self.name, format_price(self.price), self.qty)
    }
}

impl Summary for Purchase {
    fn summary(&self) -> String {
        format!(
            "{} {} pair(s) {}",
            self.user,
            self.unit_count(),
            format_price(self.total)
        )
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &ClientConfig) -> PathBuf {
    cli_db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("walker")
        .join("walker.db")
}

pub async fn open_service(db_path: &Path, config: &ClientConfig) -> Result<Service, CliError> {
    let store = LibSqlKeyValueStore::open(db_path).await?;
    let remote = HttpRemoteStore::from_config(config).map_err(walker_core::Error::from)?;
    tracing::debug!("Using store {} against {}", db_path.display(), remote.base_url());
    Ok(StorefrontService::new(Arc::new(store), Arc::new(remote)))
}

pub fn normalize_identifier(id: &str) -> Result<String, CliError> {
    let normalized = id.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(CliError::EmptyId);
    }
    Ok(normalized)
}

/// Resolve a full local id or a unique prefix of one.
pub async fn resolve_local_id<T, S>(query: &str, cache: &RecordCache<S>) -> Result<LocalId, CliError>
where
    T: Payload,
    S: KeyValueStore,
{
    if let Ok(local_id) = query.parse::<LocalId>() {
        if cache.find::<T>(&local_id).await.is_some() {
            return Ok(local_id);
        }
    }

    let matching_ids = cache.find_by_prefix::<T>(query).await;
    match matching_ids.as_slice() {
        [] => Err(CliError::RecordNotFound(
            T::COLLECTION.singular(),
            query.to_string(),
        )),
        [only] => Ok(*only),
        _ => {
            let options = matching_ids
                .iter()
                .take(3)
                .map(short_id)
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Pick a sneaker from a listing by remote id or case-insensitive name.
pub fn find_product<'a>(
    rows: &'a [DisplayRecord<Sneaker>],
    query: &str,
) -> Result<&'a DisplayRecord<Sneaker>, CliError> {
    let query = query.trim();
    rows.iter()
        .find(|row| row.remote_id.as_ref().is_some_and(|id| id.as_str() == query))
        .or_else(|| {
            rows.iter()
                .find(|row| row.payload.name.trim().eq_ignore_ascii_case(query))
        })
        .ok_or_else(|| CliError::ProductNotFound(query.to_string()))
}

/// Product id used for cart grouping: the remote id once known, else the local id.
pub fn product_id(row: &DisplayRecord<Sneaker>) -> String {
    row.remote_id
        .as_ref()
        .map(ToString::to_string)
        .or_else(|| row.local_id.map(|id| id.to_string()))
        .unwrap_or_else(|| row.payload.name.clone())
}

pub fn short_id(local_id: &LocalId) -> String {
    local_id.to_string().chars().take(13).collect()
}

/// Storefront prices are in rand.
pub fn format_price(amount: f64) -> String {
    format!("R{amount:.2}")
}

pub fn format_listing_lines(rows: &[DisplayRecord<Sneaker>]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let id = row.remote_id.as_ref().map_or_else(
                || row.local_id.as_ref().map(short_id).unwrap_or_default(),
                ToString::to_string,
            );
            let name = &row.payload.name;
            let price = format_price(row.payload.price);
            let stock = if row.payload.is_out_of_stock() {
                "sold out".to_string()
            } else {
                format!("{} left", row.payload.qty)
            };

            if row.pending {
                format!("{id:<13}  {name:<30}  {price:>10}  {stock:<10}  (pending sync)")
            } else {
                format!("{id:<13}  {name:<30}  {price:>10}  {stock}")
            }
        })
        .collect()
}

pub fn listing_to_item(row: &DisplayRecord<Sneaker>) -> SneakerListItem {
    SneakerListItem {
        id: row.remote_id.as_ref().map(ToString::to_string),
        local_id: row.local_id.map(|id| id.to_string()),
        name: row.payload.name.clone(),
        price: row.payload.price,
        qty: row.payload.qty,
        desc: row.payload.desc.clone(),
        image: row.payload.image.clone(),
        pending: row.pending,
    }
}

pub fn format_pending_lines<T: Summary>(records: &[Record<T>], now_ms: i64) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let id = short_id(&record.local_id());
            let summary = record.payload().summary();
            let relative_time = format_relative_time(record.created_at(), now_ms);
            format!("{id:<13}  {summary:<50}  {relative_time}")
        })
        .collect()
}

pub fn pending_to_item<T: Payload + Summary>(
    record: &Record<T>,
    now_ms: i64,
) -> Result<PendingItem, CliError> {
    Ok(PendingItem {
        local_id: record.local_id().to_string(),
        created_at: record.created_at(),
        relative_time: format_relative_time(record.created_at(), now_ms),
        summary: record.payload().summary(),
        payload: serde_json::to_value(record.payload())?,
    })
}

pub fn format_cart_lines(cart: &Cart) -> Vec<String> {
    let mut lines = cart
        .lines()
        .iter()
        .map(|line: &CartLine| {
            let key = line.key();
            let name = &line.name;
            let unit = format_price(line.price);
            let subtotal = format_price(line.price * f64::from(line.qty));
            format!("{key:<24}  {name:<30}  {:>3} x {unit:>10}  {subtotal:>10}", line.qty)
        })
        .collect::<Vec<_>>();
    lines.push(format!("Total: {}", format_price(cart.total())));
    lines
}

pub fn format_sync_report(report: &SyncReport) -> String {
    let collection = report.collection;
    if report.skipped {
        return format!("{collection}: sync already in progress, skipped");
    }

    match &report.failure {
        Some(failure) => format!(
            "{collection}: {} of {} synced, {} pending; stopped: {failure}",
            report.synced, report.attempted, report.remaining
        ),
        None if report.attempted == 0 => format!("{collection}: nothing to sync"),
        None => format!(
            "{collection}: {} synced, {} pending",
            report.synced, report.remaining
        ),
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else {
        format!("{}d ago", diff / day)
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
