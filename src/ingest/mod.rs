/// CSV Ingestion
/// Turns an uploaded CSV document into a validated in-memory transaction table.
///
/// Shape problems (missing required columns, no data rows) are the caller's
/// single validation error. Malformed individual rows are dropped with a
/// counted warning; an unparseable timestamp is NOT a malformed row here, the
/// smurfing detector handles those itself.
use std::collections::HashMap;

use tracing::warn;

use crate::core::errors::{EngineError, Result};
use crate::core::{Transaction, TransactionTable};
use crate::metrics;

pub const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

pub fn parse_csv(data: &[u8]) -> Result<(TransactionTable, IngestStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| EngineError::InvalidInput(format!("unreadable CSV header: {}", e)))?
        .clone();

    let mut col: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        col.entry(name).or_insert(idx);
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !col.contains_key(c))
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let idx_id = col["transaction_id"];
    let idx_sender = col["sender_id"];
    let idx_receiver = col["receiver_id"];
    let idx_amount = col["amount"];
    let idx_ts = col["timestamp"];

    let mut stats = IngestStats::default();
    let mut rows: Vec<Transaction> = Vec::new();

    for record in reader.records() {
        stats.rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(_) => {
                stats.rows_dropped += 1;
                continue;
            }
        };

        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let sender = field(idx_sender);
        let receiver = field(idx_receiver);
        let amount = field(idx_amount).parse::<f64>();

        let amount = match amount {
            Ok(a) if a >= 0.0 && a.is_finite() => a,
            _ => {
                stats.rows_dropped += 1;
                continue;
            }
        };
        if sender.is_empty() || receiver.is_empty() {
            stats.rows_dropped += 1;
            continue;
        }

        rows.push(Transaction {
            transaction_id: field(idx_id).to_string(),
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            amount,
            timestamp: field(idx_ts).to_string(),
        });
        stats.rows_kept += 1;
    }

    if rows.is_empty() {
        return Err(EngineError::InvalidInput(
            "CSV contains no valid transaction rows".to_string(),
        ));
    }

    if stats.rows_dropped > 0 {
        warn!("{} malformed rows dropped during ingestion", stats.rows_dropped);
        metrics::ROWS_DROPPED
            .with_label_values(&["malformed_row"])
            .inc_by(stats.rows_dropped as f64);
    }
    metrics::ROWS_INGESTED.inc_by(stats.rows_kept as f64);

    Ok((TransactionTable::new(rows), stats))
}
