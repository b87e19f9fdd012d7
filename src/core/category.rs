//! Category business logic.
//!
//! Categories are upserted on first use by a transaction, keyed on (name, kind).
//! The built-in default set is seeded at initialization; users accumulate their
//! own custom set on top of it. Deleting a category that still has referencing
//! transactions is an expected, common request, so `delete_if_unused` reports
//! the outcome as a boolean instead of an error.

use crate::{
    config::settings::CategorySeed,
    entities::{Category, Transaction, TransactionKind, category, transaction},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Finds a category by its (name, kind) upsert key.
pub async fn find_by_name_and_kind<C>(
    db: &C,
    name: &str,
    kind: TransactionKind,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Name.eq(name))
        .filter(category::Column::Kind.eq(kind))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves a category by (name, kind), creating it if absent.
///
/// Newly created categories are attributed to `created_by` and are not part of
/// the default set. Works inside an open database transaction so transaction
/// insertion and category creation commit together.
pub async fn get_or_create<C>(
    db: &C,
    name: &str,
    kind: TransactionKind,
    created_by: Option<i64>,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_by_name_and_kind(db, name, kind).await? {
        return Ok(existing);
    }

    debug!("Creating category '{name}' ({kind}) on first use");
    let new_category = category::ActiveModel {
        name: Set(name.to_string()),
        kind: Set(kind),
        is_default: Set(false),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    new_category.insert(db).await.map_err(Into::into)
}

/// Lists the categories visible to a user: the default set plus their own
/// custom categories, ordered by name.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(
            category::Column::IsDefault
                .eq(true)
                .or(category::Column::CreatedBy.eq(user_id)),
        )
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a category if no transaction references it.
///
/// Returns `Ok(true)` when the category was deleted, `Ok(false)` when it was
/// left intact because at least one transaction still references it. Fails
/// with [`Error::CategoryNotFound`] for an unknown id.
pub async fn delete_if_unused(db: &DatabaseConnection, category_id: i64) -> Result<bool> {
    let category = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })?;

    let references = Transaction::find()
        .filter(transaction::Column::CategoryId.eq(category_id))
        .count(db)
        .await?;

    if references > 0 {
        debug!(
            "Refusing to delete category '{}': {references} referencing transactions",
            category.name
        );
        return Ok(false);
    }

    category.delete(db).await?;
    Ok(true)
}

/// Seeds the default category set, skipping entries that already exist.
///
/// Returns the number of categories inserted. Safe to run on every startup.
pub async fn seed_default_categories(
    db: &DatabaseConnection,
    seeds: &[CategorySeed],
) -> Result<usize> {
    let mut inserted = 0;
    for seed in seeds {
        if find_by_name_and_kind(db, &seed.name, seed.kind)
            .await?
            .is_some()
        {
            continue;
        }

        let new_category = category::ActiveModel {
            name: Set(seed.name.clone()),
            kind: Set(seed.kind),
            is_default: Set(true),
            created_by: Set(None),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        new_category.insert(db).await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {inserted} default categories");
    }
    Ok(inserted)
}
