use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, TransactionKind, categories,
    error::on_unique_violation,
    transactions, users,
    util::{contains_ignore_case, normalize_category_name, normalize_optional_text},
};

use super::{Engine, with_tx};

pub const DEFAULT_INCOME_CATEGORIES: [&str; 5] =
    ["Salary", "Freelance", "Investments", "Gifts", "Other Income"];

pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 10] = [
    "Groceries",
    "Rent",
    "Utilities",
    "Transportation",
    "Entertainment",
    "Dining Out",
    "Healthcare",
    "Shopping",
    "Education",
    "Other Expenses",
];

/// Filters for listing categories.
#[derive(Clone, Debug, Default)]
pub struct CategoryListFilter {
    pub kind: Option<TransactionKind>,
    /// Case-insensitive substring of the name, matched literally.
    pub search: Option<String>,
}

/// Fields to change on a category; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub kind: Option<TransactionKind>,
}

fn duplicate_category(name: &str, kind: TransactionKind) -> EngineError {
    EngineError::ExistingCategory(format!(
        "{kind} category \"{name}\" already exists"
    ))
}

impl Engine {
    pub async fn list_categories(
        &self,
        user_id: &str,
        filter: &CategoryListFilter,
    ) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().filter(categories::Column::UserId.eq(user_id));
        if let Some(kind) = filter.kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }
        let search = normalize_optional_text(filter.search.as_deref());

        query
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Kind)
            .all(&self.database)
            .await?
            .into_iter()
            .filter(|model| {
                search
                    .as_deref()
                    .is_none_or(|needle| contains_ignore_case(&model.name, needle))
            })
            .map(Category::try_from)
            .collect()
    }

    pub async fn category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<Category> {
        let model = require_category(&self.database, category_id, user_id).await?;
        Category::try_from(model)
    }

    /// Creates a category owned by `user_id`.
    pub async fn create_category(
        &self,
        name: &str,
        kind: TransactionKind,
        user_id: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_category_name(name)?;

        with_tx!(self, |db_tx| {
            ensure_category_unique(&db_tx, user_id, &name, kind, None).await?;

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name.clone()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| on_unique_violation(err, || duplicate_category(&name, kind)))?;

            tracing::debug!("user {user_id} created {kind} category {}", model.id);
            Category::try_from(model)
        })
    }

    /// Renames and/or retypes a category.
    ///
    /// The kind can only change while the category has no transactions, so
    /// existing transactions always keep the kind of their category.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        patch: CategoryPatch,
        user_id: &str,
    ) -> ResultEngine<Category> {
        let new_name = patch
            .name
            .as_deref()
            .map(normalize_category_name)
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = require_category(&db_tx, category_id, user_id).await?;
            let current_kind = TransactionKind::try_from(model.kind.as_str())?;
            let kind = patch.kind.unwrap_or(current_kind);
            let name = new_name.unwrap_or_else(|| model.name.clone());

            if kind != current_kind {
                let used_by = transactions::Entity::find()
                    .filter(transactions::Column::CategoryId.eq(category_id))
                    .count(&db_tx)
                    .await?;
                if used_by > 0 {
                    return Err(EngineError::KindMismatch(format!(
                        "cannot change the type of a category used by {used_by} transaction(s)"
                    )));
                }
            }

            ensure_category_unique(&db_tx, user_id, &name, kind, Some(category_id)).await?;

            let mut active: categories::ActiveModel = model.into();
            active.name = ActiveValue::Set(name.clone());
            active.kind = ActiveValue::Set(kind.as_str().to_string());
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| on_unique_violation(err, || duplicate_category(&name, kind)))?;

            Category::try_from(model)
        })
    }

    /// Deletes a category together with every transaction filed under it.
    pub async fn delete_category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_category(&db_tx, category_id, user_id).await?;

            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(
                "user {user_id} deleted category {category_id} and {} transaction(s)",
                removed.rows_affected
            );
            Ok(())
        })
    }

    /// Creates the default income and expense categories that `user_id` does
    /// not have yet. Returns how many were created.
    pub async fn seed_default_categories(&self, user_id: &str) -> ResultEngine<usize> {
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }

            let defaults = DEFAULT_INCOME_CATEGORIES
                .iter()
                .map(|name| (*name, TransactionKind::Income))
                .chain(
                    DEFAULT_EXPENSE_CATEGORIES
                        .iter()
                        .map(|name| (*name, TransactionKind::Expense)),
                );

            let mut created = 0;
            for (name, kind) in defaults {
                let exists = categories::Entity::find()
                    .filter(categories::Column::UserId.eq(user_id))
                    .filter(categories::Column::Name.eq(name))
                    .filter(categories::Column::Kind.eq(kind.as_str()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if exists {
                    continue;
                }
                categories::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(user_id.to_string()),
                    name: ActiveValue::Set(name.to_string()),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                }
                .insert(&db_tx)
                .await?;
                created += 1;
            }

            tracing::info!("seeded {created} default categories for {user_id}");
            Ok(created)
        })
    }
}

/// Loads a category owned by `user_id`; other users' categories are reported
/// as missing.
pub(super) async fn require_category<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
    user_id: &str,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(categories::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
}

async fn ensure_category_unique<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    name: &str,
    kind: TransactionKind,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let mut query = categories::Entity::find()
        .filter(categories::Column::UserId.eq(user_id))
        .filter(categories::Column::Name.eq(name))
        .filter(categories::Column::Kind.eq(kind.as_str()));
    if let Some(id) = except {
        query = query.filter(categories::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(duplicate_category(name, kind));
    }
    Ok(())
}
