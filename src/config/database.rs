//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Table definitions are generated from the entity models with
//! `Schema::create_table_from_entity`, so the database schema always matches the Rust
//! struct definitions without manual SQL. The composite uniqueness constraint on
//! (category name, kind) and the covering index for per-user date-range queries cannot
//! be expressed on the entities themselves, so they are created here explicitly.

use crate::entities::{Category, Transaction, User, category, transaction};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/finance_buddy.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the database at the given URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables and indexes from the entity definitions.
///
/// Idempotent: every statement is created with `IF NOT EXISTS`, so this can run
/// on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Create tables using SeaORM's schema generation
    let mut user_table = schema.create_table_from_entity(User);
    user_table.if_not_exists();
    let mut category_table = schema.create_table_from_entity(Category);
    category_table.if_not_exists();
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table.if_not_exists();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;

    // (name, kind) is the upsert key for categories; enforce it in storage too
    let category_name_kind = Index::create()
        .name("idx_categories_name_kind")
        .table(Category)
        .col(category::Column::Name)
        .col(category::Column::Kind)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&category_name_kind)).await?;

    // Statistics reads filter on (user, occurred_at)
    let transaction_user_date = Index::create()
        .name("idx_transactions_user_occurred_at")
        .table(Transaction)
        .col(transaction::Column::UserId)
        .col(transaction::Column::OccurredAt)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&transaction_user_date)).await?;

    Ok(())
}
