//! Shared test utilities for `FinanceBuddy`.
//!
//! This module provides common helper functions for setting up in-memory test
//! databases and building test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    cache::StatsCache,
    config::database::create_tables,
    core::{ledger::LedgerEntry, tracker::FinanceTracker},
    entities::{TransactionKind, user},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::time::Duration;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates a tracker over a fresh in-memory database with a default cache.
pub async fn setup_tracker() -> Result<FinanceTracker> {
    let db = setup_test_db().await?;
    Ok(FinanceTracker::new(db))
}

/// Creates a tracker whose cache uses the given TTL, for expiry tests.
pub async fn setup_tracker_with_ttl(ttl: Duration) -> Result<FinanceTracker> {
    let db = setup_test_db().await?;
    Ok(FinanceTracker::with_cache(
        db,
        StatsCache::with_settings(ttl, 16),
    ))
}

/// Creates a test user keyed on `chat_id` with default reporting preferences.
pub async fn create_test_user(db: &DatabaseConnection, chat_id: i64) -> Result<user::Model> {
    crate::core::ledger::ensure_user_exists(
        db,
        chat_id,
        &crate::core::ledger::UserProfile::default(),
    )
    .await
}

/// Parses a decimal literal, panicking on malformed test input.
#[must_use]
pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// Builds a UTC timestamp from calendar components.
#[must_use]
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

/// Builds an in-memory ledger entry for pure aggregation tests.
#[must_use]
pub fn entry(
    id: i64,
    kind: TransactionKind,
    amount: &str,
    category: &str,
    occurred_at: DateTime<Utc>,
) -> LedgerEntry {
    LedgerEntry {
        id,
        user_id: 1,
        kind,
        amount: dec(amount),
        category: category.to_string(),
        note: None,
        occurred_at,
    }
}
