//! Hucha ledger engine.
//!
//! The engine owns the household ledger: users, the category/payment-method
//! catalog, budgets, and the transactions themselves. A single user action can
//! expand into several persisted rows (an N-instalment purchase becomes N
//! entries sharing a purchase key; a shared expense becomes one payer entry
//! plus one split row per debtor), and every such expansion commits atomically.
//!
//! There is no network surface here: callers (dashboard, admin CLI) talk to
//! [`Engine`] directly and key their read caches on [`Engine::revision`].

pub use budgets::BudgetPeriod;
pub use commands::{
    BudgetRow, CategoryRow, GroupRef, MethodRow, RecordTransactionCmd, SharedExpenseCmd, SplitSpec,
};
pub use error::EngineError;
pub use expense_splits::SplitStatus;
pub use ops::{
    BudgetRecord, BudgetUsage, CategoryRecord, Engine, EngineBuilder, MethodRecord, PendingSplit,
    TransactionDetail, TransactionListFilter,
};
pub use payment_methods::MethodKind;
pub use transactions::EntryKind;
pub use user_settings::UserSettings;

mod budgets;
mod categories;
mod commands;
mod error;
mod expense_groups;
mod expense_splits;
mod group_members;
mod ops;
mod payment_methods;
mod transactions;
mod tutorial_progress;
mod user_settings;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
