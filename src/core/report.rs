//! Report formatting helpers.
//!
//! The transport layer renders these strings into chat messages; nothing else
//! in the crate produces user-facing text. This is the one place where exact
//! decimal values become rounded display text - amounts at two decimal places,
//! percentages at one.

use crate::core::statistics::{Breakdown, Statistics};
use crate::core::tracker::PeriodReport;
use crate::entities::TransactionKind;
use rust_decimal::Decimal;

/// Formats an amount with two-place currency precision.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

/// Formats an amount with the sign implied by its kind, like "+100.50" or "-75.00".
#[must_use]
pub fn format_signed_amount(kind: TransactionKind, amount: Decimal) -> String {
    match kind {
        TransactionKind::Income => format!("+{amount:.2}"),
        TransactionKind::Expense => format!("-{amount:.2}"),
    }
}

/// Formats a full-precision percentage rounded to one decimal place.
#[must_use]
pub fn format_percentage(percentage: Decimal) -> String {
    format!("{percentage:.1}%")
}

/// Renders a statistics summary with per-category detail, ready for a chat
/// message body.
#[must_use]
pub fn format_statistics_message(stats: &Statistics, breakdown: &Breakdown) -> String {
    let mut message = String::new();
    message.push_str(&format!("Total income: {}\n", format_amount(stats.total_income)));
    message.push_str(&format!("Total expense: {}\n", format_amount(stats.total_expense)));
    message.push_str(&format!("Balance: {}\n", format_amount(stats.balance)));

    if !breakdown.income.is_empty() {
        message.push_str("\nIncome by category:\n");
        for share in &breakdown.income {
            message.push_str(&format!(
                "- {}: {} ({})\n",
                share.category,
                format_amount(share.total),
                format_percentage(share.percentage)
            ));
        }
    }

    if !breakdown.expense.is_empty() {
        message.push_str("\nExpenses by category:\n");
        for share in &breakdown.expense {
            message.push_str(&format!(
                "- {}: {} ({})\n",
                share.category,
                format_amount(share.total),
                format_percentage(share.percentage)
            ));
        }
    }

    message
}

/// Renders a period-over-period comparison.
#[must_use]
pub fn format_period_report(report: &PeriodReport) -> String {
    format!(
        "Period {} to {}\nIncome: {} (previous {})\nExpense: {} (previous {})\nBalance: {} (previous {})\n",
        report.current_period.start,
        report.current_period.end,
        format_amount(report.current.total_income),
        format_amount(report.previous.total_income),
        format_amount(report.current.total_expense),
        format_amount(report.previous.total_expense),
        format_amount(report.current.balance),
        format_amount(report.previous.balance),
    )
}
