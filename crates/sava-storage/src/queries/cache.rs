// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result-cache operations over the `sentiment_cache` table.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use sava_core::fingerprint::fingerprint;
use sava_core::types::{truncate_chars, MAX_HEADLINE_CHARS};
use sava_core::{CacheStats, ClassificationRecord, SavaError, Sentiment, Verdict};

use crate::database::{map_tr_err, Database, TIMESTAMP_FORMAT};

const SELECT_COLUMNS: &str =
    "SELECT fingerprint, label, explanation, headline, created_at, hit_count FROM sentiment_cache";

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Oldest `created_at` that is still fresh. Rows at or before it count as expired.
///
/// Ages reaching past the representable calendar clamp to its start, so
/// nothing is expired.
fn expiry_cutoff(now: DateTime<Utc>, max_age_days: u32) -> String {
    let cutoff = TimeDelta::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    format_ts(cutoff)
}

fn row_to_record(row: &Row<'_>) -> Result<ClassificationRecord, rusqlite::Error> {
    let label: String = row.get(1)?;
    let label = Sentiment::from_str(&label)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let created_at: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(ClassificationRecord {
        fingerprint: row.get(0)?,
        label,
        explanation: row.get(2)?,
        headline: row.get(3)?,
        created_at,
        hit_count: row.get(5)?,
        from_cache: true,
    })
}

/// Look up a fresh record for `text` and count the hit.
///
/// The select and the increment run in one transaction on the writer thread.
pub async fn get(
    db: &Database,
    text: &str,
    max_age_days: u32,
) -> Result<Option<ClassificationRecord>, SavaError> {
    let key = fingerprint(text);
    let cutoff = expiry_cutoff(Utc::now(), max_age_days);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let found = tx
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE fingerprint = ?1 AND created_at > ?2"),
                    params![key, cutoff],
                    row_to_record,
                )
                .optional()?;

            let found = match found {
                Some(mut record) => {
                    tx.execute(
                        "UPDATE sentiment_cache SET hit_count = hit_count + 1 WHERE fingerprint = ?1",
                        params![key],
                    )?;
                    record.hit_count = record.hit_count.saturating_add(1);
                    Some(record)
                }
                None => None,
            };

            tx.commit()?;
            Ok(found)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the record for `text`, stamped now.
pub async fn put(
    db: &Database,
    text: &str,
    label: Sentiment,
    explanation: &str,
) -> Result<ClassificationRecord, SavaError> {
    put_at(db, text, label, explanation, Utc::now()).await
}

/// Insert or replace the record for `text` with an explicit creation time.
pub async fn put_at(
    db: &Database,
    text: &str,
    label: Sentiment,
    explanation: &str,
    created_at: DateTime<Utc>,
) -> Result<ClassificationRecord, SavaError> {
    let verdict = Verdict::new(label, explanation);
    let record = ClassificationRecord {
        fingerprint: fingerprint(text),
        label: verdict.label,
        explanation: verdict.explanation,
        headline: truncate_chars(text.trim(), MAX_HEADLINE_CHARS),
        created_at: created_at.trunc_subsecs(3),
        hit_count: 1,
        from_cache: false,
    };

    let row = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO sentiment_cache
                 (fingerprint, headline, label, explanation, created_at, hit_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                params![
                    row.fingerprint,
                    row.headline,
                    row.label.to_string(),
                    row.explanation,
                    format_ts(row.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(record)
}

/// Entry count, summed hits, and label distribution over every stored row.
pub async fn stats(db: &Database) -> Result<CacheStats, SavaError> {
    db.connection()
        .call(|conn| {
            let (entries, hits): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(hit_count), 0) FROM sentiment_cache",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let mut distribution = BTreeMap::new();
            let mut stmt =
                conn.prepare("SELECT label, COUNT(*) FROM sentiment_cache GROUP BY label")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (label, count) = row?;
                if let Ok(label) = Sentiment::from_str(&label) {
                    distribution.insert(label, count.max(0) as u64);
                }
            }

            Ok(CacheStats::new(
                entries.max(0) as u64,
                hits.max(0) as u64,
                distribution,
            ))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every record aged `max_age_days` or more.
pub async fn sweep(db: &Database, max_age_days: u32) -> Result<u64, SavaError> {
    let cutoff = expiry_cutoff(Utc::now(), max_age_days);
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM sentiment_cache WHERE created_at <= ?1",
                params![cutoff],
            )?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}
