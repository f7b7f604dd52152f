//! Personal finance engine.
//!
//! Owns the schema entities and every operation on them: user-scoped
//! categories, transactions and monthly budgets, plus the aggregate views
//! (summary, category breakdown, monthly trend, budget-vs-spend).
//!
//! Amounts are [`Money`] values in integer cents. All operations take the
//! calling user's id and never return another user's data.

pub use budgets::{Budget, BudgetStatus, UpsertOutcome};
pub use categories::Category;
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    BudgetPatch, CategoryListFilter, CategoryPatch, DEFAULT_EXPENSE_CATEGORIES,
    DEFAULT_INCOME_CATEGORIES, Engine, EngineBuilder, NewTransaction, TransactionListFilter,
    TransactionOrdering, TransactionPatch,
};
pub use statistics::{CategoryBreakdown, DateRange, MonthlyTotals, Summary};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

mod budgets;
mod categories;
mod error;
mod money;
mod ops;
mod statistics;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
