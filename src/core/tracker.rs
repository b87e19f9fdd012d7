//! The finance tracker - the injected store + cache pair behind every request.
//!
//! `FinanceTracker` owns a database connection and a [`StatsCache`] and is the
//! only type the transport layer talks to. Mutations flow to the ledger and
//! invalidate the owner's cached statistics before returning; reads probe the
//! cache first and repopulate it from the aggregation engine on a miss. There
//! is no global instance - construct one per process (or per test) and pass it
//! around.

use crate::{
    cache::StatsCache,
    core::{
        category,
        ledger::{self, LedgerEntry, NewTransaction, TransactionUpdate, UserProfile},
        period::{Period, ReportPeriod},
        statistics::{self, Breakdown, CategoryStatistics, Statistics},
    },
    entities::{PeriodType, TransactionKind, category::Model as CategoryModel,
        transaction::Model as TransactionModel, user::Model as UserModel},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::debug;

/// A period-over-period report: the current reporting window and the one
/// before it, each with its statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PeriodReport {
    /// The reporting window containing the reference date
    pub current_period: Period,
    /// Statistics over the current window
    pub current: Statistics,
    /// The window immediately before the current one
    pub previous_period: Period,
    /// Statistics over the previous window
    pub previous: Statistics,
}

/// Store + cache pair serving all reads and mutations for the finance core.
pub struct FinanceTracker {
    db: DatabaseConnection,
    cache: StatsCache,
}

impl FinanceTracker {
    /// Tracker with a default-configured cache.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            cache: StatsCache::new(),
        }
    }

    /// Tracker with an explicitly configured cache.
    #[must_use]
    pub fn with_cache(db: DatabaseConnection, cache: StatsCache) -> Self {
        Self { db, cache }
    }

    /// The underlying connection, for collaborators that need direct store
    /// access (seeding, maintenance).
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Creates the user row for `chat_id` if it does not exist yet. The
    /// transport layer calls this before any mutating operation.
    pub async fn ensure_user_exists(
        &self,
        chat_id: i64,
        profile: &UserProfile,
    ) -> Result<UserModel> {
        ledger::ensure_user_exists(&self.db, chat_id, profile).await
    }

    /// Records a transaction and invalidates the user's cached statistics
    /// before returning, so no later read in the same causal chain can see
    /// pre-mutation numbers.
    pub async fn add_transaction(
        &self,
        chat_id: i64,
        new: NewTransaction,
    ) -> Result<TransactionModel> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        let inserted = ledger::add_transaction(&self.db, &user, new).await?;
        self.cache.invalidate_user(user.id).await;
        Ok(inserted)
    }

    /// Applies a partial update and invalidates the owner's cached statistics.
    pub async fn update_transaction(
        &self,
        transaction_id: i64,
        update: TransactionUpdate,
    ) -> Result<TransactionModel> {
        let updated = ledger::update_transaction(&self.db, transaction_id, update).await?;
        self.cache.invalidate_user(updated.user_id).await;
        Ok(updated)
    }

    /// Deletes a transaction and invalidates the owner's cached statistics.
    pub async fn delete_transaction(&self, transaction_id: i64) -> Result<()> {
        let deleted = ledger::delete_transaction(&self.db, transaction_id).await?;
        self.cache.invalidate_user(deleted.user_id).await;
        Ok(())
    }

    /// A user's transactions, newest first, with optional inclusive date
    /// bounds and an optional cap.
    pub async fn get_transactions(
        &self,
        chat_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<u64>,
    ) -> Result<Vec<LedgerEntry>> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        ledger::get_transactions(&self.db, user.id, start, end, limit).await
    }

    /// Total balance across the user's whole ledger.
    pub async fn get_total_balance(&self, chat_id: i64) -> Result<Decimal> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        ledger::get_total_balance(&self.db, user.id).await
    }

    /// Statistics over the given range, served from the cache when fresh.
    ///
    /// On a miss the transactions are loaded, summarized, and the snapshot is
    /// stored with the configured TTL - only after the aggregation fully
    /// completed, so an abandoned read never commits a partial entry.
    pub async fn get_statistics(
        &self,
        chat_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Statistics> {
        let user = ledger::find_user(&self.db, chat_id).await?;

        if let Some(hit) = self.cache.get_statistics(user.id, start, end).await {
            debug!("Statistics cache hit for user {}", user.id);
            return Ok(hit);
        }

        let entries = ledger::get_transactions(&self.db, user.id, start, end, None).await?;
        let stats = statistics::summarize(entries);
        self.cache
            .put_statistics(user.id, start, end, stats.clone())
            .await;
        Ok(stats)
    }

    /// Category-level statistics over the given range, cached like
    /// [`Self::get_statistics`].
    pub async fn get_category_statistics(
        &self,
        chat_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CategoryStatistics>> {
        let user = ledger::find_user(&self.db, chat_id).await?;

        if let Some(hit) = self.cache.get_category_statistics(user.id, start, end).await {
            debug!("Category statistics cache hit for user {}", user.id);
            return Ok(hit);
        }

        let entries = ledger::get_transactions(&self.db, user.id, start, end, None).await?;
        let stats = statistics::summarize_by_category(&entries);
        self.cache
            .put_category_statistics(user.id, start, end, stats.clone())
            .await;
        Ok(stats)
    }

    /// Income/expense detail lists with percentage shares, derived from the
    /// (cached) statistics for the range.
    pub async fn get_detailed_breakdown(
        &self,
        chat_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Breakdown> {
        let stats = self.get_statistics(chat_id, start, end).await?;
        Ok(statistics::detailed_breakdown(&stats.transactions))
    }

    /// Period-over-period report for the user's configured reporting window,
    /// anchored at `reference`. Both windows go through the cached read path.
    pub async fn period_report(&self, chat_id: i64, reference: NaiveDate) -> Result<PeriodReport> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        let config = ReportPeriod::new(user.report_period, user.report_start_day)?;

        let current_period = config.current_period(reference);
        let previous_period = config.previous_period(reference);

        let (start, end) = current_period.datetime_bounds();
        let current = self.get_statistics(chat_id, Some(start), Some(end)).await?;

        let (start, end) = previous_period.datetime_bounds();
        let previous = self.get_statistics(chat_id, Some(start), Some(end)).await?;

        Ok(PeriodReport {
            current_period,
            current,
            previous_period,
            previous,
        })
    }

    /// Validates and persists the user's reporting preference.
    pub async fn set_report_period(
        &self,
        chat_id: i64,
        period_type: PeriodType,
        start_day: u32,
    ) -> Result<UserModel> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        ledger::update_report_period(&self.db, user, period_type, start_day).await
    }

    /// The categories visible to the user: defaults plus their own.
    pub async fn list_categories(&self, chat_id: i64) -> Result<Vec<CategoryModel>> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        category::list_for_user(&self.db, user.id).await
    }

    /// Creates a custom category for the user if it does not exist yet.
    pub async fn create_category(
        &self,
        chat_id: i64,
        name: &str,
        kind: TransactionKind,
    ) -> Result<CategoryModel> {
        let user = ledger::find_user(&self.db, chat_id).await?;
        category::get_or_create(&self.db, name, kind, Some(user.id)).await
    }

    /// Deletes a category if nothing references it; `Ok(false)` when it is
    /// still in use.
    pub async fn delete_category_if_unused(&self, category_id: i64) -> Result<bool> {
        category::delete_if_unused(&self.db, category_id).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::{dec, setup_tracker, setup_tracker_with_ttl, utc};
    use std::time::Duration;

    const CHAT_ID: i64 = 42;

    fn income_on(amount: &str, category: &str, occurred_at: DateTime<Utc>) -> NewTransaction {
        NewTransaction {
            amount: dec(amount),
            kind: TransactionKind::Income,
            category: category.to_string(),
            note: None,
            occurred_at: Some(occurred_at),
        }
    }

    fn expense(amount: &str, category: &str) -> NewTransaction {
        NewTransaction {
            amount: dec(amount),
            kind: TransactionKind::Expense,
            category: category.to_string(),
            note: None,
            occurred_at: None,
        }
    }

    #[tokio::test]
    async fn test_reads_require_a_known_user() -> Result<()> {
        let tracker = setup_tracker().await?;
        let result = tracker.get_statistics(999, None, None).await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_statistics_over_covering_range() -> Result<()> {
        // Income 100.50 "salary" on day 1 and 50.00 "gifts" on day 2
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;
        tracker
            .add_transaction(CHAT_ID, income_on("100.50", "salary", utc(2024, 1, 1, 10, 0, 0)))
            .await?;
        tracker
            .add_transaction(CHAT_ID, income_on("50.00", "gifts", utc(2024, 1, 2, 10, 0, 0)))
            .await?;

        let stats = tracker
            .get_statistics(
                CHAT_ID,
                Some(utc(2024, 1, 1, 0, 0, 0)),
                Some(utc(2024, 1, 31, 23, 59, 59)),
            )
            .await?;

        assert_eq!(stats.total_income, dec("150.50"));
        assert_eq!(stats.total_expense, Decimal::ZERO);
        assert_eq!(stats.balance, dec("150.50"));

        let by_category = tracker
            .get_category_statistics(
                CHAT_ID,
                Some(utc(2024, 1, 1, 0, 0, 0)),
                Some(utc(2024, 1, 31, 23, 59, 59)),
            )
            .await?;
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category[0].category, "salary");
        assert_eq!(by_category[0].total, dec("100.50"));
        assert_eq!(by_category[1].category, "gifts");
        assert_eq!(by_category[1].total, dec("50.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_invalidate_cached_statistics() -> Result<()> {
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;

        // Populate the cache for the open range
        let before = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(before.total_income, Decimal::ZERO);

        tracker
            .add_transaction(CHAT_ID, income_on("10.00", "salary", utc(2024, 1, 1, 0, 0, 0)))
            .await?;

        // The pre-mutation snapshot must not be served
        let after_add = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(after_add.total_income, dec("10.00"));

        let id = after_add.transactions[0].id;
        tracker
            .update_transaction(
                id,
                TransactionUpdate {
                    amount: Some(dec("25.00")),
                    ..Default::default()
                },
            )
            .await?;
        let after_update = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(after_update.total_income, dec("25.00"));

        tracker.delete_transaction(id).await?;
        let after_delete = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(after_delete.total_income, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_restores_balance_and_cache_reflects_it() -> Result<()> {
        // Add expense 75.00 "food", then delete it
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;

        let baseline = tracker.get_total_balance(CHAT_ID).await?;
        let inserted = tracker.add_transaction(CHAT_ID, expense("75.00", "food")).await?;
        assert_eq!(
            tracker.get_total_balance(CHAT_ID).await?,
            baseline - dec("75.00")
        );

        // Warm the cache while the expense exists
        let with_expense = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(with_expense.total_expense, dec("75.00"));

        tracker.delete_transaction(inserted.id).await?;

        assert_eq!(tracker.get_total_balance(CHAT_ID).await?, baseline);
        let after = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(after.total_expense, Decimal::ZERO);
        assert!(after.transactions.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_cached_value_served_until_ttl_then_recomputed() -> Result<()> {
        let tracker = setup_tracker_with_ttl(Duration::from_millis(80)).await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;
        tracker
            .add_transaction(CHAT_ID, income_on("10.00", "salary", utc(2024, 1, 1, 0, 0, 0)))
            .await?;

        let first = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(first.total_income, dec("10.00"));

        // Mutate the store behind the tracker's back: the cached snapshot is
        // served until its TTL elapses, then the read path recomputes
        let user = ledger::find_user(tracker.connection(), CHAT_ID).await?;
        ledger::add_transaction(
            tracker.connection(),
            &user,
            income_on("5.00", "gifts", utc(2024, 1, 2, 0, 0, 0)),
        )
        .await?;

        let stale = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(stale.total_income, dec("10.00"));

        tokio::time::sleep(Duration::from_millis(120)).await;

        let fresh = tracker.get_statistics(CHAT_ID, None, None).await?;
        assert_eq!(fresh.total_income, dec("15.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_detailed_breakdown_through_tracker() -> Result<()> {
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;
        tracker
            .add_transaction(CHAT_ID, income_on("75.00", "salary", utc(2024, 1, 1, 0, 0, 0)))
            .await?;
        tracker
            .add_transaction(CHAT_ID, income_on("25.00", "gifts", utc(2024, 1, 2, 0, 0, 0)))
            .await?;

        let breakdown = tracker.get_detailed_breakdown(CHAT_ID, None, None).await?;
        assert_eq!(breakdown.income.len(), 2);
        assert_eq!(breakdown.income[0].category, "salary");
        assert_eq!(breakdown.income[0].percentage, dec("75"));
        assert_eq!(breakdown.income[1].percentage, dec("25"));
        assert!(breakdown.expense.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_period_report_stitches_current_and_previous_windows() -> Result<()> {
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;
        tracker
            .set_report_period(CHAT_ID, PeriodType::Monthly, 5)
            .await?;

        // One transaction in the current window (from Jan 5) and one in the
        // previous (Dec 5 - Jan 4)
        tracker
            .add_transaction(CHAT_ID, income_on("100.00", "salary", utc(2024, 1, 10, 0, 0, 0)))
            .await?;
        tracker
            .add_transaction(CHAT_ID, income_on("40.00", "salary", utc(2023, 12, 20, 0, 0, 0)))
            .await?;

        let report = tracker
            .period_report(CHAT_ID, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .await?;

        assert_eq!(
            report.current_period.start,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert_eq!(report.current.total_income, dec("100.00"));
        assert_eq!(report.previous.total_income, dec("40.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_report_period_rejects_bad_start_day() -> Result<()> {
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;

        let result = tracker
            .set_report_period(CHAT_ID, PeriodType::Quarterly, 30)
            .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidStartDay { start_day: 30 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_category_operations_through_tracker() -> Result<()> {
        let tracker = setup_tracker().await?;
        tracker
            .ensure_user_exists(CHAT_ID, &UserProfile::default())
            .await?;

        let created = tracker
            .create_category(CHAT_ID, "books", TransactionKind::Expense)
            .await?;
        let listed = tracker.list_categories(CHAT_ID).await?;
        assert!(listed.iter().any(|c| c.id == created.id));

        assert!(tracker.delete_category_if_unused(created.id).await?);

        let kept = tracker
            .create_category(CHAT_ID, "food", TransactionKind::Expense)
            .await?;
        tracker.add_transaction(CHAT_ID, expense("9.99", "food")).await?;
        assert!(!tracker.delete_category_if_unused(kept.id).await?);

        Ok(())
    }
}
