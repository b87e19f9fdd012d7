//! Ledger business logic - the durable record of users and their transactions.
//!
//! All mutations validate at this layer before touching storage: amounts must be
//! strictly positive, notes are truncated to the length cap, and category
//! references are resolved (created on first use for inserts, resolved-only for
//! updates). Insertion and category upserts run inside one database transaction
//! so a failed insert never leaves a stray category behind. Cache invalidation
//! is the tracker's job; these functions only touch the store.

use crate::{
    core::{category, period::ReportPeriod},
    entities::{Category, PeriodType, Transaction, TransactionKind, transaction, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Maximum note length in characters; longer notes are truncated, not rejected.
pub const NOTE_MAX_CHARS: usize = 1000;

/// Optional profile details captured when a user is first seen.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    /// Platform username
    pub username: Option<String>,
    /// First name as reported by the chat platform
    pub first_name: Option<String>,
    /// Last name as reported by the chat platform
    pub last_name: Option<String>,
}

/// Parameters for recording a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Transaction amount, must be strictly positive
    pub amount: Decimal,
    /// Income or expense
    pub kind: TransactionKind,
    /// Category name; created on first use if absent
    pub category: String,
    /// Optional free-text note
    pub note: Option<String>,
    /// When the money moved; defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Partial update of an existing transaction; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    /// New amount, must be strictly positive
    pub amount: Option<Decimal>,
    /// New category name; must already exist for the transaction's kind
    pub category: Option<String>,
    /// New note text
    pub note: Option<String>,
    /// New occurred-at timestamp
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A transaction with its category name resolved, as consumed by aggregation
/// and by the transport layer's listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LedgerEntry {
    /// Transaction id
    pub id: i64,
    /// Owning user's internal id
    pub user_id: i64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Transaction amount
    pub amount: Decimal,
    /// Resolved category name
    pub category: String,
    /// Optional free-text note
    pub note: Option<String>,
    /// When the money moved
    pub occurred_at: DateTime<Utc>,
}

fn truncate_note(note: String) -> String {
    if note.chars().count() > NOTE_MAX_CHARS {
        note.chars().take(NOTE_MAX_CHARS).collect()
    } else {
        note
    }
}

/// Creates the user row for `chat_id` if it does not exist yet.
///
/// The transport layer calls this before any transaction-mutating operation.
/// Reporting preferences default to a monthly period starting on day 1.
pub async fn ensure_user_exists(
    db: &DatabaseConnection,
    chat_id: i64,
    profile: &UserProfile,
) -> Result<user::Model> {
    if let Some(existing) = crate::entities::User::find()
        .filter(user::Column::ChatId.eq(chat_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    info!("Registering new user for chat id {chat_id}");
    let new_user = user::ActiveModel {
        chat_id: Set(chat_id),
        username: Set(profile.username.clone()),
        first_name: Set(profile.first_name.clone()),
        last_name: Set(profile.last_name.clone()),
        report_period: Set(PeriodType::Monthly),
        report_start_day: Set(1),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_user.insert(db).await.map_err(Into::into)
}

/// Looks up the user row for `chat_id`, failing with [`Error::UserNotFound`]
/// when the transport layer skipped [`ensure_user_exists`].
pub async fn find_user(db: &DatabaseConnection, chat_id: i64) -> Result<user::Model> {
    crate::entities::User::find()
        .filter(user::Column::ChatId.eq(chat_id))
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { chat_id })
}

/// Records a new transaction for `user`.
///
/// Validates the amount, truncates the note, resolves or creates the category,
/// defaults `occurred_at` to now, and stamps both audit timestamps. The insert
/// and any category creation commit atomically.
pub async fn add_transaction(
    db: &DatabaseConnection,
    user: &user::Model,
    new: NewTransaction,
) -> Result<transaction::Model> {
    if new.amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    debug!(
        "Adding {} transaction of {} in '{}' for user {}",
        new.kind, new.amount, new.category, user.id
    );

    let txn = db.begin().await?;

    let category =
        category::get_or_create(&txn, &new.category, new.kind, Some(user.id)).await?;

    let now = Utc::now();
    let model = transaction::ActiveModel {
        user_id: Set(user.id),
        kind: Set(new.kind),
        amount: Set(new.amount.round_dp(2)),
        category_id: Set(category.id),
        note: Set(new.note.map(truncate_note)),
        occurred_at: Set(new.occurred_at.unwrap_or(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = model.insert(&txn).await?;
    txn.commit().await?;

    Ok(inserted)
}

/// Applies a partial update to an existing transaction.
///
/// Unlike insertion, a category change only resolves existing categories - an
/// unknown name fails with [`Error::CategoryNotFound`] instead of creating one.
/// The new category must match the transaction's kind. `updated_at` is
/// refreshed whenever any field changes.
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    update: TransactionUpdate,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let existing = Transaction::find_by_id(transaction_id)
        .one(&txn)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    let kind = existing.kind;

    let mut active: transaction::ActiveModel = existing.into();

    if let Some(amount) = update.amount {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount { amount });
        }
        active.amount = Set(amount.round_dp(2));
    }

    if let Some(name) = update.category {
        let Some(resolved) = category::find_by_name_and_kind(&txn, &name, kind).await? else {
            return Err(Error::CategoryNotFound { name });
        };
        active.category_id = Set(resolved.id);
    }

    if let Some(note) = update.note {
        active.note = Set(Some(truncate_note(note)));
    }

    if let Some(occurred_at) = update.occurred_at {
        active.occurred_at = Set(occurred_at);
    }

    active.updated_at = Set(Utc::now());

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Deletes a transaction permanently, returning the removed row so the caller
/// knows which user's cache to invalidate.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<transaction::Model> {
    let existing = Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let snapshot = existing.clone();
    existing.delete(db).await?;

    debug!(
        "Deleted transaction {} for user {}",
        snapshot.id, snapshot.user_id
    );
    Ok(snapshot)
}

/// Retrieves a single transaction by id.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a user's transactions with resolved category names.
///
/// Both date bounds are inclusive and independently effective. Results are
/// ordered by occurred-at descending (id descending on ties) and optionally
/// capped to the `limit` most recent.
pub async fn get_transactions(
    db: &DatabaseConnection,
    user_id: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<u64>,
) -> Result<Vec<LedgerEntry>> {
    let mut query = Transaction::find().filter(transaction::Column::UserId.eq(user_id));

    if let Some(start) = start {
        query = query.filter(transaction::Column::OccurredAt.gte(start));
    }
    if let Some(end) = end {
        query = query.filter(transaction::Column::OccurredAt.lte(end));
    }

    query = query
        .order_by_desc(transaction::Column::OccurredAt)
        .order_by_desc(transaction::Column::Id);

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let rows = query.find_also_related(Category).all(db).await?;

    rows.into_iter()
        .map(|(model, related)| {
            let category = related.ok_or_else(|| Error::CategoryNotFound {
                name: model.category_id.to_string(),
            })?;
            Ok(LedgerEntry {
                id: model.id,
                user_id: model.user_id,
                kind: model.kind,
                amount: model.amount,
                category: category.name,
                note: model.note,
                occurred_at: model.occurred_at,
            })
        })
        .collect()
}

/// Total balance across all of a user's transactions: Σincome − Σexpense,
/// zero when no transactions exist. Exact decimal arithmetic throughout.
pub async fn get_total_balance(db: &DatabaseConnection, user_id: i64) -> Result<Decimal> {
    let rows = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(rows.iter().fold(Decimal::ZERO, |acc, t| match t.kind {
        TransactionKind::Income => acc + t.amount,
        TransactionKind::Expense => acc - t.amount,
    }))
}

/// Persists a user's reporting preference after validating it.
pub async fn update_report_period(
    db: &DatabaseConnection,
    user: user::Model,
    period_type: PeriodType,
    start_day: u32,
) -> Result<user::Model> {
    // Rejects start days outside [1, 28]
    ReportPeriod::new(period_type, start_day)?;

    let mut active: user::ActiveModel = user.into();
    active.report_period = Set(period_type);
    active.report_start_day = Set(start_day);
    active.update(db).await.map_err(Into::into)
}
