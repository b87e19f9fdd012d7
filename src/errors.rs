//! Unified error types for the finance core.
//!
//! Errors fall into three families the transport layer treats differently:
//! validation errors (bad caller input, recoverable by re-prompting), not-found
//! errors (unknown user/transaction/category), and storage errors wrapping the
//! underlying persistence failure. The [`Error::is_validation`] and
//! [`Error::is_not_found`] predicates expose that classification without the
//! caller matching on individual variants.

use rust_decimal::Decimal;
use thiserror::Error;

/// All errors produced by the finance core.
#[derive(Debug, Error)]
pub enum Error {
    /// Transaction amounts must be strictly positive
    #[error("transaction amount must be positive, got {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Report periods may only start on days 1-28 (29-31 would not exist in every month)
    #[error("report start day must be between 1 and 28, got {start_day}")]
    InvalidStartDay {
        /// The rejected start day
        start_day: u32,
    },

    /// No user row exists for the given chat-platform identity
    #[error("no user registered for chat id {chat_id}")]
    UserNotFound {
        /// The external chat-platform identity
        chat_id: i64,
    },

    /// No transaction row exists for the given id
    #[error("transaction {id} not found")]
    TransactionNotFound {
        /// The unknown transaction id
        id: i64,
    },

    /// No category matches the given name (and the transaction's kind)
    #[error("category '{name}' not found")]
    CategoryNotFound {
        /// The unresolved category name
        name: String,
    },

    /// Configuration could not be read or parsed
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Any failure of the underlying store, with the original cause preserved
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for caller-input errors the transport layer can recover from by re-prompting.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. } | Self::InvalidStartDay { .. }
        )
    }

    /// True when a referenced user, transaction, or category does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::TransactionNotFound { .. }
                | Self::CategoryNotFound { .. }
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
