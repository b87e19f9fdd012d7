//! Category entity - Income/expense categories transactions are grouped under.
//!
//! A category is identified by its surrogate `id`; the (`name`, `kind`) pair is
//! unique at the storage layer. The built-in set seeded at initialization has
//! `is_default = true` and no creator; categories created on first use by a
//! transaction carry the creating user's id.

use super::kind::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "salary", "food")
    pub name: String,
    /// Whether this category groups income or expense transactions
    pub kind: TransactionKind,
    /// True for the built-in set seeded at initialization
    pub is_default: bool,
    /// User who created this category, None for the built-in set
    pub created_by: Option<i64>,
    /// When this category was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// A custom category belongs to the user who created it
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
