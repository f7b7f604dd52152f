use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, Order, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, Transaction, TransactionKind, categories, transactions,
    util::{contains_pattern, normalize_optional_text},
};

use super::{Engine, with_tx};

/// Input for a new transaction.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub category_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: Option<String>,
    /// Defaults to the creation date.
    pub date: Option<NaiveDate>,
}

/// Fields to change on a transaction; `None` keeps the stored value.
///
/// `description: Some(None)` clears the description.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
}

/// Sort order for transaction listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransactionOrdering {
    DateAsc,
    #[default]
    DateDesc,
    AmountAsc,
    AmountDesc,
    CategoryNameAsc,
    CategoryNameDesc,
}

impl FromStr for TransactionOrdering {
    type Err = EngineError;

    /// Accepts `date`, `amount`, `category_name` (alias `category__name`),
    /// each optionally prefixed with `-` for descending order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (descending, field) = match trimmed.strip_prefix('-') {
            Some(field) => (true, field),
            None => (false, trimmed),
        };
        match (field, descending) {
            ("date", false) => Ok(Self::DateAsc),
            ("date", true) => Ok(Self::DateDesc),
            ("amount", false) => Ok(Self::AmountAsc),
            ("amount", true) => Ok(Self::AmountDesc),
            ("category_name" | "category__name", false) => Ok(Self::CategoryNameAsc),
            ("category_name" | "category__name", true) => Ok(Self::CategoryNameDesc),
            _ => Err(EngineError::InvalidOrdering(format!(
                "unsupported ordering \"{trimmed}\""
            ))),
        }
    }
}

/// Filters for listing transactions. Every filter is optional.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
    /// Exact calendar date.
    pub date: Option<NaiveDate>,
    /// Substring of the description or the category name, matched literally.
    /// Case is ignored for ASCII letters only.
    pub search: Option<String>,
    pub ordering: TransactionOrdering,
}

fn ensure_positive(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn ensure_kind_matches(kind: TransactionKind, category_kind: TransactionKind) -> ResultEngine<()> {
    if kind != category_kind {
        return Err(EngineError::KindMismatch(format!(
            "Transaction type must match category type. Got {kind} transaction with {category_kind} category."
        )));
    }
    Ok(())
}

/// Resolves the category a transaction will be filed under and checks that
/// it belongs to `user_id` and has the transaction's kind.
async fn validated_category<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
    kind: TransactionKind,
    user_id: &str,
) -> ResultEngine<categories::Model> {
    let category = categories::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .filter(|category| category.user_id == user_id)
        .ok_or_else(|| {
            EngineError::InvalidCategory("You can only use your own categories.".to_string())
        })?;
    ensure_kind_matches(kind, TransactionKind::try_from(category.kind.as_str())?)?;
    Ok(category)
}

async fn require_transaction<C: ConnectionTrait>(
    db: &C,
    transaction_id: Uuid,
    user_id: &str,
) -> ResultEngine<(transactions::Model, Option<categories::Model>)> {
    transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::UserId.eq(user_id))
        .find_also_related(categories::Entity)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
}

impl Engine {
    /// Records a transaction for `user_id`.
    ///
    /// Rejected before anything is written when the category is not the
    /// caller's, when its kind differs from the transaction's, or when the
    /// amount is not positive.
    pub async fn create_transaction(
        &self,
        input: NewTransaction,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        ensure_positive(input.amount)?;

        with_tx!(self, |db_tx| {
            let category =
                validated_category(&db_tx, input.category_id, input.kind, user_id).await?;

            let model = transactions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id.to_string()),
                category_id: ActiveValue::Set(category.id),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(input.amount.minor()),
                description: ActiveValue::Set(normalize_optional_text(
                    input.description.as_deref(),
                )),
                date: ActiveValue::Set(input.date.unwrap_or_else(|| now.date_naive())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            tracing::debug!(
                "user {user_id} recorded {} transaction {}",
                input.kind,
                model.id
            );
            Transaction::from_models(model, Some(category))
        })
    }

    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        let (model, category) = require_transaction(&self.database, transaction_id, user_id).await?;
        Transaction::from_models(model, category)
    }

    /// Applies `patch` on top of the stored transaction and validates the
    /// merged result the same way as a new transaction.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        patch: TransactionPatch,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        if let Some(amount) = patch.amount {
            ensure_positive(amount)?;
        }

        with_tx!(self, |db_tx| {
            let (model, _) = require_transaction(&db_tx, transaction_id, user_id).await?;

            let kind = match patch.kind {
                Some(kind) => kind,
                None => TransactionKind::try_from(model.kind.as_str())?,
            };
            let category_id = patch.category_id.unwrap_or(model.category_id);
            let category = validated_category(&db_tx, category_id, kind, user_id).await?;

            let mut active: transactions::ActiveModel = model.into();
            active.category_id = ActiveValue::Set(category.id);
            active.kind = ActiveValue::Set(kind.as_str().to_string());
            if let Some(amount) = patch.amount {
                active.amount_minor = ActiveValue::Set(amount.minor());
            }
            if let Some(description) = patch.description {
                active.description =
                    ActiveValue::Set(normalize_optional_text(description.as_deref()));
            }
            if let Some(date) = patch.date {
                active.date = ActiveValue::Set(date);
            }
            active.updated_at = ActiveValue::Set(now);
            let model = active.update(&db_tx).await?;

            Transaction::from_models(model, Some(category))
        })
    }

    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            ));
        }
        Ok(())
    }

    /// Lists the caller's transactions, newest first unless `filter.ordering`
    /// says otherwise. Ties are broken by creation time.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .find_also_related(categories::Entity);

        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(date) = filter.date {
            query = query.filter(transactions::Column::Date.eq(date));
        }
        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::col((transactions::Entity, transactions::Column::Description))
                            .like(contains_pattern(&search)),
                    )
                    .add(
                        Expr::col((categories::Entity, categories::Column::Name))
                            .like(contains_pattern(&search)),
                    ),
            );
        }

        query = match filter.ordering {
            TransactionOrdering::DateAsc => query
                .order_by(transactions::Column::Date, Order::Asc)
                .order_by(transactions::Column::CreatedAt, Order::Asc),
            TransactionOrdering::DateDesc => query
                .order_by(transactions::Column::Date, Order::Desc)
                .order_by(transactions::Column::CreatedAt, Order::Desc),
            TransactionOrdering::AmountAsc => query
                .order_by(transactions::Column::AmountMinor, Order::Asc)
                .order_by(transactions::Column::Date, Order::Desc)
                .order_by(transactions::Column::CreatedAt, Order::Desc),
            TransactionOrdering::AmountDesc => query
                .order_by(transactions::Column::AmountMinor, Order::Desc)
                .order_by(transactions::Column::Date, Order::Desc)
                .order_by(transactions::Column::CreatedAt, Order::Desc),
            TransactionOrdering::CategoryNameAsc => query
                .order_by(categories::Column::Name, Order::Asc)
                .order_by(transactions::Column::Date, Order::Desc)
                .order_by(transactions::Column::CreatedAt, Order::Desc),
            TransactionOrdering::CategoryNameDesc => query
                .order_by(categories::Column::Name, Order::Desc)
                .order_by(transactions::Column::Date, Order::Desc)
                .order_by(transactions::Column::CreatedAt, Order::Desc),
        };

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(model, category)| Transaction::from_models(model, category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_parses_known_fields_and_directions() {
        assert_eq!(
            "-date".parse::<TransactionOrdering>().unwrap(),
            TransactionOrdering::DateDesc
        );
        assert_eq!(
            "amount".parse::<TransactionOrdering>().unwrap(),
            TransactionOrdering::AmountAsc
        );
        assert_eq!(
            "-category__name".parse::<TransactionOrdering>().unwrap(),
            TransactionOrdering::CategoryNameDesc
        );
        assert_eq!(
            "category_name".parse::<TransactionOrdering>().unwrap(),
            TransactionOrdering::CategoryNameAsc
        );
    }

    #[test]
    fn ordering_rejects_unknown_fields() {
        let err = "description".parse::<TransactionOrdering>().unwrap_err();
        assert_eq!(err.field(), Some("ordering"));
    }

    #[test]
    fn kind_mismatch_names_both_kinds() {
        let err = ensure_kind_matches(TransactionKind::Expense, TransactionKind::Income).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transaction type must match category type. Got expense transaction with income category."
        );
        assert_eq!(err.field(), Some("type"));
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(ensure_positive(Money::ZERO).is_err());
        assert!(ensure_positive(Money::new(-5)).is_err());
        assert!(ensure_positive(Money::new(1)).is_ok());
    }
}
