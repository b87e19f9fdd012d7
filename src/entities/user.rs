//! User entity - One row per chat-platform user.
//!
//! Users are created lazily the first time the transport layer sees an
//! unfamiliar `chat_id` and are never deleted in normal operation. Reporting
//! preferences (period type and start day) live here as typed columns rather
//! than an opaque settings blob.

use super::kind::PeriodType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Internal surrogate identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// External chat-platform identity this user is keyed on
    #[sea_orm(unique)]
    pub chat_id: i64,
    /// Platform username, if the platform exposed one
    pub username: Option<String>,
    /// First name as reported by the chat platform
    pub first_name: Option<String>,
    /// Last name as reported by the chat platform
    pub last_name: Option<String>,
    /// Period type for recurring reports (monthly or quarterly)
    pub report_period: PeriodType,
    /// Day of month (1-28) the reporting period starts on
    pub report_start_day: u32,
    /// When this user was first seen
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One user may have created many custom categories
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
