//! Closed enumerations shared by the entities and the core logic.
//!
//! Transaction kind and report period type were free-form strings in earlier
//! revisions of this system; typos silently created phantom categories. Both
//! are closed `SeaORM` active enums now, stored as short strings and rejected
//! at the type level everywhere else.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a transaction (or category) represents money coming in or going out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received
    #[sea_orm(string_value = "income")]
    Income,
    /// Money spent
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl TransactionKind {
    /// The wire/storage spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar alignment of a user's recurring reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// One reporting window per month
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// One reporting window per calendar quarter
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
}
