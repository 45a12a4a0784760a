//! Read-only access to the trading daemon's `stats_swaps` table.

use std::path::Path;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::domain::SwapRecord;
use crate::error::TrackerError;

const COLUMNS: &str = "id, uuid, maker_coin, taker_coin, \
     maker_coin_ticker, maker_coin_platform, taker_coin_ticker, taker_coin_platform, \
     started_at, finished_at, \
     CAST(maker_amount AS TEXT) AS maker_amount, \
     CAST(taker_amount AS TEXT) AS taker_amount, \
     CAST(maker_coin_usd_price AS TEXT) AS maker_coin_usd_price, \
     CAST(taker_coin_usd_price AS TEXT) AS taker_coin_usd_price, \
     is_success, maker_pubkey, taker_pubkey, maker_gui, taker_gui, maker_version, taker_version";

/// Rows read in one query.
#[derive(Debug, Default)]
pub struct SwapBatch {
    /// Successfully decoded swaps, in id order.
    pub records: Vec<SwapRecord>,
    /// Highest row id seen, including rows that failed to decode.
    pub last_id: Option<i64>,
}

/// SQLite-backed swap source using a single read-only connection.
#[derive(Debug, Clone)]
pub struct SqliteSwapSource {
    pool: SqlitePool,
}

impl SqliteSwapSource {
    /// Opens the database at `path` read-only.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Source`] if the file cannot be opened.
    pub async fn connect(path: &Path) -> Result<Self, TrackerError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Closes the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Highest row id, or `-1` for an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Source`] on database failure.
    pub async fn max_id(&self) -> Result<i64, TrackerError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), -1) FROM stats_swaps")
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// Rows with `id > last_id`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Source`] on database failure.
    pub async fn fetch_after(&self, last_id: i64) -> Result<SwapBatch, TrackerError> {
        let sql = format!("SELECT {COLUMNS} FROM stats_swaps WHERE id > ? ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .bind(last_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(decode_batch(&rows))
    }

    /// Rows whose `finished_at` lies in `[start, stop]`, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Source`] on database failure.
    pub async fn fetch_finished_between(
        &self,
        start: i64,
        stop: i64,
    ) -> Result<SwapBatch, TrackerError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM stats_swaps WHERE finished_at BETWEEN ? AND ? ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(start)
            .bind(stop)
            .fetch_all(&self.pool)
            .await?;
        Ok(decode_batch(&rows))
    }
}

fn decode_batch(rows: &[SqliteRow]) -> SwapBatch {
    let mut batch = SwapBatch::default();
    for row in rows {
        let id = row.try_get::<i64, _>("id").ok();
        if id.is_some() {
            batch.last_id = id;
        }
        match decode_row(row) {
            Ok(record) => batch.records.push(record),
            Err(e) => tracing::warn!(row_id = ?id, error = %e, "skipping undecodable swap row"),
        }
    }
    batch
}

fn decode_row(row: &SqliteRow) -> Result<SwapRecord, sqlx::Error> {
    Ok(SwapRecord {
        id: row.try_get("id")?,
        uuid: row.try_get("uuid")?,
        maker_coin: row.try_get("maker_coin")?,
        taker_coin: row.try_get("taker_coin")?,
        maker_coin_ticker: row.try_get("maker_coin_ticker")?,
        maker_coin_platform: row.try_get("maker_coin_platform")?,
        taker_coin_ticker: row.try_get("taker_coin_ticker")?,
        taker_coin_platform: row.try_get("taker_coin_platform")?,
        started_at: row.try_get("started_at")?,
        finished_at: row.try_get("finished_at")?,
        maker_amount: amount(row, "maker_amount")?,
        taker_amount: amount(row, "taker_amount")?,
        maker_coin_usd_price: price(row, "maker_coin_usd_price")?,
        taker_coin_usd_price: price(row, "taker_coin_usd_price")?,
        is_success: row
            .try_get::<Option<i64>, _>("is_success")?
            .map(|v| v != 0),
        maker_pubkey: row.try_get("maker_pubkey")?,
        taker_pubkey: row.try_get("taker_pubkey")?,
        maker_gui: row.try_get("maker_gui")?,
        taker_gui: row.try_get("taker_gui")?,
        maker_version: row.try_get("maker_version")?,
        taker_version: row.try_get("taker_version")?,
    })
}

/// NULL amounts count as zero.
fn amount(row: &SqliteRow, column: &str) -> Result<BigDecimal, sqlx::Error> {
    Ok(price(row, column)?.unwrap_or_default())
}

fn price(row: &SqliteRow, column: &str) -> Result<Option<BigDecimal>, sqlx::Error> {
    row.try_get::<Option<String>, _>(column)?
        .map(|raw| parse_decimal(&raw))
        .transpose()
}

/// Parses plain or scientific notation (`1.0e-08`) text without losing
/// digits.
fn parse_decimal(raw: &str) -> Result<BigDecimal, sqlx::Error> {
    BigDecimal::from_str(raw.trim()).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}


#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::test_support::{create_db, insert_swap};
    use super::*;
    use crate::domain::swap_record::test_support::dec;

    #[test]
    fn parses_scientific_notation() {
        let Ok(v) = parse_decimal("1.0e-08") else {
            panic!("scientific notation");
        };
        assert_eq!(v, dec("0.00000001"));
        let Ok(v) = parse_decimal(" 12.5 ") else {
            panic!("plain decimal");
        };
        assert_eq!(v, dec("12.5"));
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn parses_beyond_96_bit_precision() {
        let Ok(v) = parse_decimal("100000000000000000000000000000") else {
            panic!("30-digit integer");
        };
        assert_eq!(v.to_plain_string(), "100000000000000000000000000000");

        let long = "0.1234567890123456789012345678901234";
        let Ok(v) = parse_decimal(long) else {
            panic!("34-digit fraction");
        };
        assert_eq!(v.to_plain_string(), long);

        let Ok(v) = parse_decimal("1.0e+29") else {
            panic!("REAL rendered with an exponent");
        };
        assert_eq!(v, dec("100000000000000000000000000000"));
    }

    #[tokio::test]
    async fn reads_rows_after_cursor_and_between_times() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("MM2.db");
        let Ok(writer) = create_db(&path).await else {
            panic!("create db");
        };
        for (uuid, ts) in [("a", 100), ("b", 200), ("c", 300)] {
            let Ok(()) = insert_swap(&writer, uuid, "KMD", "DGB-segwit", ts, "10.5", "2").await else {
                panic!("insert");
            };
        }

        let Ok(source) = SqliteSwapSource::connect(&path).await else {
            panic!("connect");
        };
        let Ok(max) = source.max_id().await else {
            panic!("max id");
        };
        assert_eq!(max, 3);

        let Ok(batch) = source.fetch_after(1).await else {
            panic!("fetch after");
        };
        let uuids: Vec<&str> = batch.records.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["b", "c"]);
        assert_eq!(batch.last_id, Some(3));

        let Some(first) = batch.records.first() else {
            panic!("one record");
        };
        assert_eq!(first.maker_amount, dec("10.5"));
        assert_eq!(first.taker_amount, dec("2"));
        assert_eq!(first.maker_coin_usd_price, None);
        assert_eq!(first.is_success, Some(true));
        assert_eq!(first.finished_at, Some(200));
        assert_eq!(first.maker_pubkey.as_deref(), Some("pk-b"));
        assert_eq!(first.taker_symbol(), "DGB");

        let Ok(between) = source.fetch_finished_between(100, 200).await else {
            panic!("fetch between");
        };
        assert_eq!(between.records.len(), 2);

        let Ok(empty) = source.fetch_after(3).await else {
            panic!("fetch after end");
        };
        assert!(empty.records.is_empty());
        assert_eq!(empty.last_id, None);
        source.close().await;
    }

    #[tokio::test]
    async fn empty_table_has_max_id_minus_one() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("MM2.db");
        let Ok(_writer) = create_db(&path).await else {
            panic!("create db");
        };
        let Ok(source) = SqliteSwapSource::connect(&path).await else {
            panic!("connect");
        };
        assert!(matches!(source.max_id().await, Ok(-1)));
    }

    #[tokio::test]
    async fn oversized_amounts_are_read_not_dropped() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("MM2.db");
        let Ok(writer) = create_db(&path).await else {
            panic!("create db");
        };
        let huge = "100000000000000000000000000000";
        let Ok(()) = insert_swap(&writer, "big", "KMD", "DGB", 100, huge, "0.000000000001").await else {
            panic!("insert");
        };

        let Ok(source) = SqliteSwapSource::connect(&path).await else {
            panic!("connect");
        };
        let Ok(batch) = source.fetch_after(-1).await else {
            panic!("fetch");
        };
        let Some(record) = batch.records.first() else {
            panic!("oversized row was skipped");
        };
        // The DECIMAL column stores these as REAL, so only magnitude survives.
        let maker = crate::domain::decimal_to_f64(&record.maker_amount);
        let taker = crate::domain::decimal_to_f64(&record.taker_amount);
        assert!((maker / 1e29 - 1.0).abs() < 1e-9);
        assert!((taker / 1e-12 - 1.0).abs() < 1e-9);
        source.close().await;
    }
}
