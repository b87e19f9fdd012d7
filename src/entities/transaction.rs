//! Transaction entity - A single recorded income or expense.
//!
//! Amounts are strictly positive decimals with two-place currency precision;
//! the `kind` column says which direction the money moved. `occurred_at` is
//! when the money moved (defaulting to creation time), while `created_at` and
//! `updated_at` are audit timestamps. Rows are deleted permanently - there is
//! no soft-delete.

use super::kind::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Whether this is income or expense
    pub kind: TransactionKind,
    /// Transaction amount, strictly positive, two-place currency precision
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    /// Category this transaction is grouped under
    pub category_id: i64,
    /// Optional free-text note, capped at 1000 characters
    pub note: Option<String>,
    /// When the income/expense actually occurred
    pub occurred_at: DateTimeUtc,
    /// When this row was inserted
    pub created_at: DateTimeUtc,
    /// When this row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each transaction belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
