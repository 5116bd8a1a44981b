//! Permissive field extraction for provider payloads.
//!
//! Each field has an ordered list of lookup paths; the first path that resolves to a usable
//! value wins. Providers drift between top-level and `data`-nested layouts, so both are tried.

use crate::domain::entities::webhook_event::UNKNOWN_FIELD;
use crate::domain::value_objects::ids::EventId;
use crate::domain::value_objects::timestamps::Timestamp;
use serde_json::Value;
use time::OffsetDateTime;

pub type LookupPath = &'static [&'static str];

pub const EVENT_ID_PATHS: &[LookupPath] = &[&["id"], &["event_id"], &["data", "event_id"]];
pub const EVENT_TYPE_PATHS: &[LookupPath] =
    &[&["type"], &["event"], &["event_type"], &["data", "type"]];
pub const ORDER_ID_PATHS: &[LookupPath] = &[
    &["order_id"],
    &["data", "order_id"],
    &["data", "order", "id"],
    &["order", "id"],
];
pub const TIMESTAMP_PATHS: &[LookupPath] = &[
    &["created_at"],
    &["timestamp"],
    &["occurred_at"],
    &["data", "created_at"],
];
pub const AMOUNT_PATHS: &[LookupPath] = &[
    &["data", "amount_cents"],
    &["amount_cents"],
    &["data", "amount"],
    &["amount"],
];
pub const CURRENCY_PATHS: &[LookupPath] = &[&["data", "currency"], &["currency"]];
pub const CHARGE_ID_PATHS: &[LookupPath] =
    &[&["data", "charge_id"], &["charge_id"], &["data", "charge", "id"]];
pub const TXID_PATHS: &[LookupPath] = &[&["data", "txid"], &["txid"], &["data", "charge", "txid"]];

/// Everything ingestion and projection need from a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub event_id: EventId,
    pub event_type: String,
    pub order_id: String,
    pub event_timestamp: Option<Timestamp>,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub charge_id: Option<String>,
    pub txid: Option<String>,
}

/// Walk `path` through nested objects.
pub fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |current, key| current.as_object()?.get(*key))
}

/// First non-blank string (or integer, rendered as text) among `paths`.
pub fn first_text(payload: &Value, paths: &[LookupPath]) -> Option<String> {
    paths.iter().find_map(|path| match lookup(payload, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

/// First numeric amount among `paths`; fractional values are rounded.
pub fn first_amount(payload: &Value, paths: &[LookupPath]) -> Option<i64> {
    paths.iter().find_map(|path| {
        let value = lookup(payload, path)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
    })
}

/// First parsable timestamp among `paths`: RFC 3339 text or a unix epoch (seconds or millis).
pub fn first_timestamp(payload: &Value, paths: &[LookupPath]) -> Option<Timestamp> {
    paths.iter().find_map(|path| match lookup(payload, path)? {
        Value::String(s) => Timestamp::parse_rfc3339(s.trim()),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            let nanos = if raw.abs() >= 1_000_000_000_000 {
                i128::from(raw) * 1_000_000
            } else {
                i128::from(raw) * 1_000_000_000
            };
            OffsetDateTime::from_unix_timestamp_nanos(nanos)
                .ok()
                .map(Timestamp::from)
        }
        _ => None,
    })
}

/// Extract ingestion fields. `payload` is `None` when the body was not valid JSON.
pub fn extract(payload: Option<&Value>, raw_body: &[u8]) -> ExtractedFields {
    let Some(payload) = payload else {
        return ExtractedFields {
            event_id: EventId::fallback_for(raw_body),
            event_type: UNKNOWN_FIELD.to_string(),
            order_id: UNKNOWN_FIELD.to_string(),
            event_timestamp: None,
            amount_cents: None,
            currency: None,
            charge_id: None,
            txid: None,
        };
    };

    ExtractedFields {
        event_id: first_text(payload, EVENT_ID_PATHS)
            .map(EventId::new)
            .unwrap_or_else(|| EventId::fallback_for(raw_body)),
        event_type: first_text(payload, EVENT_TYPE_PATHS)
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        order_id: first_text(payload, ORDER_ID_PATHS).unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        event_timestamp: first_timestamp(payload, TIMESTAMP_PATHS),
        amount_cents: first_amount(payload, AMOUNT_PATHS),
        currency: first_text(payload, CURRENCY_PATHS).map(|c| c.to_ascii_uppercase()),
        charge_id: first_text(payload, CHARGE_ID_PATHS),
        txid: first_text(payload, TXID_PATHS),
    }
}
