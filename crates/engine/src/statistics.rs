//! Aggregate views computed from the transaction ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Money, TransactionKind};

/// Inclusive date range; an open side is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub total_income: Money,
    pub total_expenses: Money,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub category_id: Uuid,
    pub category_name: String,
    pub category_kind: TransactionKind,
    pub total: Money,
    /// Share of the kind total, rounded to 2 decimals.
    pub percentage: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthlyTotals {
    /// First day of the month.
    pub month: NaiveDate,
    pub income: Money,
    pub expense: Money,
}

impl MonthlyTotals {
    /// Short label such as `"Jan 2026"`.
    pub fn label(&self) -> String {
        self.month.format("%b %Y").to_string()
    }

    /// Sortable key such as `"2026-01"`.
    pub fn period(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }
}
