//! Aggregation engine - pure functions over a transaction set.
//!
//! Everything here is a deterministic function of its input: no storage, no
//! cache, no clock. Amount arithmetic is exact decimal throughout; percentages
//! are kept at full precision and only rounded when the report layer renders
//! them as text.

use crate::core::ledger::LedgerEntry;
use crate::entities::TransactionKind;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Time-bounded financial summary for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Sum of all income amounts
    pub total_income: Decimal,
    /// Sum of all expense amounts
    pub total_expense: Decimal,
    /// `total_income - total_expense`
    pub balance: Decimal,
    /// The transactions the totals were computed from, newest first
    pub transactions: Vec<LedgerEntry>,
}

/// Per-category total for one (category, kind) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatistics {
    /// Category name
    pub category: String,
    /// Income or expense
    pub kind: TransactionKind,
    /// Sum of amounts in this group
    pub total: Decimal,
}

/// One category's contribution to its kind's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    /// Category name
    pub category: String,
    /// Sum of amounts in this category
    pub total: Decimal,
    /// Full-precision percentage of the kind total; zero when the kind total is zero
    pub percentage: Decimal,
}

/// Income and expense detail lists, each sorted by amount descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Breakdown {
    /// Income categories with their share of total income
    pub income: Vec<CategoryShare>,
    /// Expense categories with their share of total expense
    pub expense: Vec<CategoryShare>,
}

/// Computes totals and balance over a transaction set.
#[must_use]
pub fn summarize(transactions: Vec<LedgerEntry>) -> Statistics {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;

    for entry in &transactions {
        match entry.kind {
            TransactionKind::Income => total_income += entry.amount,
            TransactionKind::Expense => total_expense += entry.amount,
        }
    }

    Statistics {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transactions,
    }
}

/// Groups a transaction set by (category, kind) and sums per group.
///
/// Sorted by total descending; ties broken by category name ascending so the
/// output is deterministic.
#[must_use]
pub fn summarize_by_category(transactions: &[LedgerEntry]) -> Vec<CategoryStatistics> {
    let mut totals: BTreeMap<(String, TransactionKind), Decimal> = BTreeMap::new();
    for entry in transactions {
        *totals
            .entry((entry.category.clone(), entry.kind))
            .or_insert(Decimal::ZERO) += entry.amount;
    }

    let mut stats: Vec<CategoryStatistics> = totals
        .into_iter()
        .map(|((category, kind), total)| CategoryStatistics {
            category,
            kind,
            total,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    stats
}

/// Per-kind category detail with each category's percentage of the kind total.
///
/// Percentages are zero when the kind total is zero. Both lists are sorted by
/// amount descending (name ascending on ties).
#[must_use]
pub fn detailed_breakdown(transactions: &[LedgerEntry]) -> Breakdown {
    let by_category = summarize_by_category(transactions);

    let kind_total = |kind: TransactionKind| {
        by_category
            .iter()
            .filter(|s| s.kind == kind)
            .fold(Decimal::ZERO, |acc, s| acc + s.total)
    };
    let income_total = kind_total(TransactionKind::Income);
    let expense_total = kind_total(TransactionKind::Expense);

    let shares = |kind: TransactionKind, total: Decimal| {
        by_category
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| CategoryShare {
                category: s.category.clone(),
                total: s.total,
                percentage: if total.is_zero() {
                    Decimal::ZERO
                } else {
                    s.total * Decimal::ONE_HUNDRED / total
                },
            })
            .collect()
    };

    Breakdown {
        income: shares(TransactionKind::Income, income_total),
        expense: shares(TransactionKind::Expense, expense_total),
    }
}
