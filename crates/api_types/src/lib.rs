//! JSON bodies and query strings of the HTTP API.
//!
//! Amounts are [`Decimal`] values with 2 fractional digits, serialized as
//! strings (`"12.50"`). Percentages are plain JSON numbers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes a field that is absent (`None`) from one explicitly set to
/// `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Request field the error refers to, when it is a validation error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Refresh {
        pub refresh: String,
    }

    /// Response of a successful login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenPair {
        pub access: String,
        pub refresh: String,
        pub user: UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccessToken {
        pub access: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub email: Option<String>,
    }
}

pub mod category {
    use super::*;

    /// Body of `POST /categories/` and `PUT /categories/{id}/`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryPatch {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryQuery {
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub search: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
    }
}

pub mod transaction {
    use super::*;

    /// Body of `POST /transactions/` and `PUT /transactions/{id}/`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: Decimal,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        /// Category id.
        pub category: Uuid,
        #[serde(default)]
        pub description: Option<String>,
        /// Defaults to today on create, to the stored date on `PUT`.
        #[serde(default)]
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionPatch {
        pub amount: Option<Decimal>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub category: Option<Uuid>,
        /// `null` clears the description, absence keeps it.
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub description: Option<Option<String>>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub category: Option<Uuid>,
        pub date: Option<NaiveDate>,
        pub search: Option<String>,
        /// `date`, `amount` or `category_name`, `-` prefixed for descending.
        pub ordering: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount: Decimal,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub description: Option<String>,
        pub date: NaiveDate,
        pub category: Uuid,
        pub category_name: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    /// Body of `POST /budgets/` and `PUT /budgets/{id}/`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        /// Any day of the month; stored as the first day.
        pub month: NaiveDate,
        pub amount: Decimal,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetPatch {
        pub month: Option<NaiveDate>,
        pub amount: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub month: NaiveDate,
        /// e.g. `"October 2026"`.
        pub month_display: String,
        pub amount: Decimal,
    }

    /// Budget-vs-spend for the current month. `id` is `null` when no budget
    /// is set for it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrentBudgetView {
        pub id: Option<Uuid>,
        pub month: NaiveDate,
        pub month_display: String,
        pub amount: Decimal,
        pub spent: Decimal,
        pub remaining: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        pub percentage_spent: Decimal,
    }
}

pub mod stats {
    use super::*;

    /// Inclusive date range of an aggregation; either side may be open.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RangeQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BreakdownQuery {
        /// Defaults to `expense`.
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_income: Decimal,
        pub total_expenses: Decimal,
        pub balance: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BreakdownItem {
        pub category_id: Uuid,
        pub category_name: String,
        pub category_type: TransactionKind,
        pub total_amount: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        pub percentage: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyItem {
        /// e.g. `"Jan 2026"`.
        pub month: String,
        /// e.g. `"2026-01"`.
        pub period: String,
        pub income: Decimal,
        pub expense: Decimal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_tells_null_from_absent_description() {
        let absent: transaction::TransactionPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: transaction::TransactionPatch =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: transaction::TransactionPatch =
            serde_json::from_str(r#"{"description": "coffee"}"#).unwrap();
        assert_eq!(set.description, Some(Some("coffee".to_string())));
    }

    #[test]
    fn amounts_are_strings_and_percentages_numbers() {
        let item = stats::BreakdownItem {
            category_id: Uuid::nil(),
            category_name: "Rent".to_string(),
            category_type: TransactionKind::Expense,
            total_amount: Decimal::new(125_000, 2),
            percentage: Decimal::new(6250, 2),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["total_amount"], "1250.00");
        assert_eq!(json["percentage"], 62.5);
        assert_eq!(json["category_type"], "expense");
    }

    #[test]
    fn amounts_accept_strings_and_numbers() {
        let from_string: budget::BudgetNew =
            serde_json::from_str(r#"{"month": "2026-10-19", "amount": "500.00"}"#).unwrap();
        let from_number: budget::BudgetNew =
            serde_json::from_str(r#"{"month": "2026-10-19", "amount": 500}"#).unwrap();
        assert_eq!(from_string.amount, from_number.amount);
    }

    #[test]
    fn error_field_is_omitted_when_absent() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "Invalid credentials".to_string(),
            field: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Invalid credentials"}"#);
    }
}
