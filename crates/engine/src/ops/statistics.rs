use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryResult, Statement, Value};
use uuid::Uuid;

use crate::{
    CategoryBreakdown, DateRange, Money, MonthlyTotals, ResultEngine, Summary, TransactionKind,
    util::year_bounds,
};

use super::Engine;

/// Appends the inclusive bounds of `range` on `column` to a WHERE clause.
fn push_range(sql: &mut String, values: &mut Vec<Value>, column: &str, range: DateRange) {
    if let Some(start) = range.start {
        sql.push_str(&format!(" AND {column} >= ?"));
        values.push(start.into());
    }
    if let Some(end) = range.end {
        sql.push_str(&format!(" AND {column} <= ?"));
        values.push(end.into());
    }
}

fn minor(row: &QueryResult, column: &str) -> ResultEngine<Money> {
    let value: i64 = row.try_get("", column)?;
    Ok(Money::new(value))
}

/// Sum of the expenses of `user_id` dated within `first..=last`.
pub(super) async fn expense_total<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    first: NaiveDate,
    last: NaiveDate,
) -> ResultEngine<Money> {
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT COALESCE(SUM(amount_minor), 0) AS total \
         FROM transactions \
         WHERE user_id = ? AND kind = ? AND date >= ? AND date <= ?",
        vec![
            user_id.into(),
            TransactionKind::Expense.as_str().into(),
            first.into(),
            last.into(),
        ],
    );
    match db.query_one(stmt).await? {
        Some(row) => minor(&row, "total"),
        None => Ok(Money::ZERO),
    }
}

impl Engine {
    /// Income, expense and balance of `user_id` over `range`.
    ///
    /// Totals are zero, never missing, when nothing falls in the range.
    pub async fn summary(&self, user_id: &str, range: DateRange) -> ResultEngine<Summary> {
        let mut sql = String::from(
            "SELECT \
               COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_minor ELSE 0 END), 0) AS income, \
               COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount_minor ELSE 0 END), 0) AS expense \
             FROM transactions \
             WHERE user_id = ?",
        );
        let mut values: Vec<Value> = vec![user_id.into()];
        push_range(&mut sql, &mut values, "date", range);

        let stmt =
            Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        let (total_income, total_expenses) = match self.database.query_one(stmt).await? {
            Some(row) => (minor(&row, "income")?, minor(&row, "expense")?),
            None => (Money::ZERO, Money::ZERO),
        };

        Ok(Summary {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        })
    }

    /// Per-category totals of `kind` over `range`, largest first.
    ///
    /// Each entry carries its share of the kind total, rounded to 2 decimals.
    pub async fn category_breakdown(
        &self,
        user_id: &str,
        kind: TransactionKind,
        range: DateRange,
    ) -> ResultEngine<Vec<CategoryBreakdown>> {
        let mut sql = String::from(
            "SELECT c.id AS category_id, c.name AS category_name, \
                    COALESCE(SUM(t.amount_minor), 0) AS total \
             FROM transactions t \
             JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ? AND t.kind = ?",
        );
        let mut values: Vec<Value> = vec![user_id.into(), kind.as_str().into()];
        push_range(&mut sql, &mut values, "t.date", range);
        sql.push_str(" GROUP BY c.id, c.name ORDER BY total DESC, c.name ASC");

        let stmt =
            Statement::from_sql_and_values(self.database.get_database_backend(), sql, values);
        let rows = self.database.query_all(stmt).await?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            let category_id: Uuid = row.try_get("", "category_id")?;
            let category_name: String = row.try_get("", "category_name")?;
            groups.push((category_id, category_name, minor(&row, "total")?));
        }

        let grand_total = groups
            .iter()
            .fold(Money::ZERO, |acc, (_, _, total)| acc + *total);

        Ok(groups
            .into_iter()
            .map(|(category_id, category_name, total)| CategoryBreakdown {
                category_id,
                category_name,
                category_kind: kind,
                total,
                percentage: total.percentage_of(grand_total),
            })
            .collect())
    }

    /// Income and expense per month of `year`, oldest first. Months without
    /// transactions are left out.
    pub async fn monthly_totals(
        &self,
        user_id: &str,
        year: i32,
    ) -> ResultEngine<Vec<MonthlyTotals>> {
        let (first, last) = year_bounds(year)?;
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT CAST(strftime('%m', date) AS INTEGER) AS month, kind, \
                    COALESCE(SUM(amount_minor), 0) AS total \
             FROM transactions \
             WHERE user_id = ? AND date >= ? AND date <= ? \
             GROUP BY month, kind \
             ORDER BY month",
            vec![user_id.into(), first.into(), last.into()],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut months: BTreeMap<u32, (Money, Money)> = BTreeMap::new();
        for row in rows {
            let month: i32 = row.try_get("", "month")?;
            let kind: String = row.try_get("", "kind")?;
            let total = minor(&row, "total")?;
            let month = u32::try_from(month).unwrap_or_default();
            let entry = months.entry(month).or_insert((Money::ZERO, Money::ZERO));
            match TransactionKind::try_from(kind.as_str())? {
                TransactionKind::Income => entry.0 += total,
                TransactionKind::Expense => entry.1 += total,
            }
        }

        Ok(months
            .into_iter()
            .filter_map(|(month, (income, expense))| {
                NaiveDate::from_ymd_opt(year, month, 1).map(|month| MonthlyTotals {
                    month,
                    income,
                    expense,
                })
            })
            .collect())
    }
}
