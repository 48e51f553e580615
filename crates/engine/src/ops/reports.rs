//! Read-side queries feeding the dashboard tables and summary cards.
//!
//! Reads run outside a transaction on the shared connection. Joined names
//! are resolved through batched lookups keyed by id.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, Statement, prelude::*};

use crate::{
    BudgetPeriod, EngineError, EntryKind, ResultEngine, SplitStatus, budgets, categories,
    expense_groups, expense_splits, payment_methods, transactions, users,
};

use super::Engine;

/// Filter for [`Engine::list_transactions`]. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub owner: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
}

/// A ledger row with its reference names resolved, ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDetail {
    pub id: Uuid,
    pub owner: String,
    pub category: String,
    pub category_icon: Option<String>,
    pub payment_method: Option<String>,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EntryKind,
    pub details: Option<String>,
    pub installments_paid: i32,
    pub installments_total: i32,
    pub purchase_id: Option<Uuid>,
    pub is_shared: bool,
    pub group: Option<String>,
}

/// An unsettled share owed by one user, with enough context to act on it.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSplit {
    pub id: i32,
    pub amount: f64,
    pub percentage: Option<f64>,
    pub details: Option<String>,
    pub date: NaiveDate,
    pub payer: String,
    pub payer_name: String,
    pub category: String,
    pub group: Option<String>,
}

/// One budget line with the spending accrued in its current period.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetUsage {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub period: BudgetPeriod,
}

impl Engine {
    /// Lists ledger rows matching the filter, newest date first.
    pub async fn list_transactions(
        &self,
        filter: TransactionListFilter,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(EngineError::InvalidAmount(
                    "date range starts after it ends".to_string(),
                ));
            }
        }

        let mut query = transactions::Entity::find();
        if let Some(owner) = &filter.owner {
            query = query.filter(transactions::Column::Owner.eq(owner));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::Date.lte(to));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        let models = query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let category_names = self.category_names(&models).await?;
        let method_names = self.method_names(&models).await?;
        let group_names = self
            .group_names(models.iter().filter_map(|m| m.group_id.clone()))
            .await?;

        models
            .into_iter()
            .map(|model| {
                let (category, category_icon) = category_names
                    .get(&model.category_id)
                    .cloned()
                    .unwrap_or_default();
                let payment_method = model
                    .payment_method_id
                    .and_then(|id| method_names.get(&id).cloned());
                let group = model.group_id.as_ref().and_then(|id| group_names.get(id).cloned());
                let entry = transactions::LedgerEntry::try_from(model)?;
                Ok(TransactionDetail {
                    id: entry.id,
                    owner: entry.owner,
                    category,
                    category_icon,
                    payment_method,
                    date: entry.date,
                    amount: entry.amount,
                    kind: entry.kind,
                    details: entry.details,
                    installments_paid: entry.installments_paid,
                    installments_total: entry.installments_total,
                    purchase_id: entry.purchase_id,
                    is_shared: entry.is_shared,
                    group,
                })
            })
            .collect()
    }

    /// Unsettled shares owed by `debtor`, newest expense first.
    pub async fn pending_splits_for(&self, debtor: &str) -> ResultEngine<Vec<PendingSplit>> {
        let splits = expense_splits::Entity::find()
            .filter(expense_splits::Column::Debtor.eq(debtor))
            .filter(expense_splits::Column::Status.eq(SplitStatus::Pending.as_str()))
            .order_by_desc(expense_splits::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let transaction_ids: HashSet<String> =
            splits.iter().map(|s| s.transaction_id.clone()).collect();
        let expenses: HashMap<String, transactions::Model> = transactions::Entity::find()
            .filter(transactions::Column::Id.is_in(transaction_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let expense_models: Vec<transactions::Model> = expenses.values().cloned().collect();
        let payer_names = self
            .user_names(expense_models.iter().map(|m| m.owner.clone()))
            .await?;
        let category_names = self.category_names(&expense_models).await?;
        let group_names = self
            .group_names(expense_models.iter().filter_map(|m| m.group_id.clone()))
            .await?;

        let mut pending = Vec::with_capacity(splits.len());
        for split in splits {
            let Some(expense) = expenses.get(&split.transaction_id) else {
                continue;
            };
            let (category, _) = category_names
                .get(&expense.category_id)
                .cloned()
                .unwrap_or_default();
            pending.push(PendingSplit {
                id: split.id,
                amount: split.amount,
                percentage: split.percentage,
                details: expense.details.clone(),
                date: expense.date,
                payer: expense.owner.clone(),
                payer_name: payer_names
                    .get(&expense.owner)
                    .cloned()
                    .unwrap_or_else(|| expense.owner.clone()),
                category,
                group: expense
                    .group_id
                    .as_ref()
                    .and_then(|id| group_names.get(id).cloned()),
            });
        }
        Ok(pending)
    }

    /// Total amount `debtor` still owes across all pending splits.
    pub async fn pending_balance(&self, debtor: &str) -> ResultEngine<f64> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT COALESCE(SUM(amount), 0.0) AS sum \
             FROM expense_splits \
             WHERE debtor = ? AND status = ?",
            vec![debtor.into(), SplitStatus::Pending.as_str().into()],
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0.0))
    }

    /// Expense totals per category name for `owner` within `[from, to]`.
    pub async fn spending_by_category(
        &self,
        owner: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<HashMap<String, f64>> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT c.name AS name, COALESCE(SUM(t.amount), 0.0) AS sum \
             FROM transactions t \
             JOIN categories c ON c.id = t.category_id \
             WHERE t.owner = ? \
               AND t.kind = ? \
               AND t.date >= ? \
               AND t.date <= ? \
             GROUP BY c.name",
            vec![
                owner.into(),
                EntryKind::Expense.as_str().into(),
                from.into(),
                to.into(),
            ],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut totals = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("", "name")?;
            let sum: f64 = row.try_get("", "sum")?;
            totals.insert(name, sum);
        }
        Ok(totals)
    }

    /// The owner's active budgets with spending accrued in the period window
    /// containing `today` (calendar week starting Monday, calendar month, or
    /// calendar year).
    pub async fn budget_usage(
        &self,
        owner: &str,
        today: NaiveDate,
    ) -> ResultEngine<Vec<BudgetUsage>> {
        let lines = budgets::Entity::find()
            .filter(budgets::Column::Owner.eq(owner))
            .filter(budgets::Column::IsActive.eq(true))
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;

        let mut usage = Vec::with_capacity(lines.len());
        for (budget, category) in lines {
            let period = BudgetPeriod::try_from(budget.period.as_str())?;
            let (from, to) = period_window(period, today)?;
            let spent_by_category = self.spending_by_category(owner, from, to).await?;
            let category = category.map(|c| c.name).unwrap_or_default();
            let spent = spent_by_category.get(&category).copied().unwrap_or(0.0);
            usage.push(BudgetUsage {
                category,
                budget: budget.amount,
                spent,
                period,
            });
        }
        Ok(usage)
    }

    async fn category_names(
        &self,
        models: &[transactions::Model],
    ) -> ResultEngine<HashMap<i32, (String, Option<String>)>> {
        let ids: HashSet<i32> = models.iter().map(|m| m.category_id).collect();
        Ok(categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|c| (c.id, (c.name, c.icon)))
            .collect())
    }

    async fn method_names(
        &self,
        models: &[transactions::Model],
    ) -> ResultEngine<HashMap<i32, String>> {
        let ids: HashSet<i32> = models.iter().filter_map(|m| m.payment_method_id).collect();
        Ok(payment_methods::Entity::find()
            .filter(payment_methods::Column::Id.is_in(ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }

    async fn group_names(
        &self,
        ids: impl Iterator<Item = String>,
    ) -> ResultEngine<HashMap<String, String>> {
        let ids: HashSet<String> = ids.collect();
        Ok(expense_groups::Entity::find()
            .filter(expense_groups::Column::Id.is_in(ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect())
    }

    async fn user_names(
        &self,
        usernames: impl Iterator<Item = String>,
    ) -> ResultEngine<HashMap<String, String>> {
        let usernames: HashSet<String> = usernames.collect();
        Ok(users::Entity::find()
            .filter(users::Column::Username.is_in(usernames))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|u| (u.username, u.name))
            .collect())
    }
}

/// Inclusive date window of the budget period containing `today`.
fn period_window(period: BudgetPeriod, today: NaiveDate) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let out_of_range =
        || EngineError::InvalidAmount("budget period out of date range".to_string());
    match period {
        BudgetPeriod::Weekly => {
            let monday = today
                .checked_sub_days(Days::new(u64::from(
                    today.weekday().num_days_from_monday(),
                )))
                .ok_or_else(out_of_range)?;
            let sunday = monday.checked_add_days(Days::new(6)).ok_or_else(out_of_range)?;
            Ok((monday, sunday))
        }
        BudgetPeriod::Monthly => {
            let first = today.with_day(1).ok_or_else(out_of_range)?;
            let next_month = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
            }
            .ok_or_else(out_of_range)?;
            let last = next_month.pred_opt().ok_or_else(out_of_range)?;
            Ok((first, last))
        }
        BudgetPeriod::Yearly => {
            let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or_else(out_of_range)?;
            let last = NaiveDate::from_ymd_opt(today.year(), 12, 31).ok_or_else(out_of_range)?;
            Ok((first, last))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_window_spans_monday_to_sunday() {
        // 2024-06-12 is a Wednesday.
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let (from, to) = period_window(BudgetPeriod::Weekly, today).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    }

    #[test]
    fn monthly_window_covers_the_calendar_month() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let (from, to) = period_window(BudgetPeriod::Monthly, today).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn monthly_window_rolls_over_december() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        let (_, to) = period_window(BudgetPeriod::Monthly, today).unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
