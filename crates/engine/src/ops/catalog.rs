//! Reconciliation of the editable reference tables.
//!
//! The dashboard edits categories, payment methods and budgets as whole
//! grids; each `sync_*` call takes the submitted grid as the desired state
//! for one owner and diffs it against the database. Global rows
//! (`owner = NULL`) are never touched.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    BudgetPeriod, BudgetRow, CategoryRow, EngineError, EntryKind, MethodKind, MethodRow,
    ResultEngine, budgets, categories, payment_methods,
};

use super::{Engine, with_tx};

/// Collects names, rejecting a grid that lists the same name twice. The
/// unique index would refuse it anyway, but as an opaque database error.
fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> ResultEngine<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
    }
    Ok(seen)
}

/// A category as stored, for the editor grid and pickers.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryRecord {
    pub id: i32,
    pub name: String,
    pub kind: EntryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
}

/// A payment method as stored.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodRecord {
    pub id: i32,
    pub name: String,
    pub kind: MethodKind,
    pub is_default: bool,
}

/// A budget row joined with its category name.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetRecord {
    pub id: i32,
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
}

impl Engine {
    /// Reconciles the owner's categories against the submitted grid.
    ///
    /// Rows absent from the submission are deleted, new names are inserted,
    /// and existing names get their kind, icon and color updated in place so
    /// transactions keep pointing at the same id. Rows with a blank name are
    /// skipped.
    pub async fn sync_categories(
        &self,
        owner: &str,
        rows: &[CategoryRow],
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner).await?;

            let existing = categories::Entity::find()
                .filter(categories::Column::Owner.eq(owner))
                .all(&db_tx)
                .await?;

            let submitted: Vec<&CategoryRow> = rows
                .iter()
                .filter(|row| !row.name.trim().is_empty())
                .collect();
            let submitted_names = unique_names(submitted.iter().map(|row| row.name.trim()))?;

            for stale in existing
                .iter()
                .filter(|model| !submitted_names.contains(model.name.as_str()))
            {
                categories::Entity::delete_by_id(stale.id).exec(&db_tx).await?;
            }

            for row in submitted {
                let name = row.name.trim();
                match existing.iter().find(|model| model.name == name) {
                    Some(model) => {
                        let mut update: categories::ActiveModel = model.clone().into();
                        update.kind = ActiveValue::Set(row.kind.as_str().to_string());
                        update.icon = ActiveValue::Set(row.icon.clone());
                        update.color = ActiveValue::Set(row.color.clone());
                        update.update(&db_tx).await?;
                    }
                    None => {
                        let category = categories::ActiveModel {
                            id: ActiveValue::NotSet,
                            name: ActiveValue::Set(name.to_string()),
                            kind: ActiveValue::Set(row.kind.as_str().to_string()),
                            icon: ActiveValue::Set(row.icon.clone()),
                            color: ActiveValue::Set(row.color.clone()),
                            owner: ActiveValue::Set(Some(owner.to_string())),
                            is_default: ActiveValue::Set(false),
                            created_at: ActiveValue::Set(at),
                        };
                        category.insert(&db_tx).await?;
                    }
                }
            }
            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(owner = %owner, "synced categories");
        Ok(())
    }

    /// Reconciles the owner's payment methods against the submitted grid.
    ///
    /// Same diff semantics as [`Engine::sync_categories`].
    pub async fn sync_payment_methods(
        &self,
        owner: &str,
        rows: &[MethodRow],
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner).await?;

            let existing = payment_methods::Entity::find()
                .filter(payment_methods::Column::Owner.eq(owner))
                .all(&db_tx)
                .await?;

            let submitted: Vec<&MethodRow> = rows
                .iter()
                .filter(|row| !row.name.trim().is_empty())
                .collect();
            let submitted_names = unique_names(submitted.iter().map(|row| row.name.trim()))?;

            for stale in existing
                .iter()
                .filter(|model| !submitted_names.contains(model.name.as_str()))
            {
                payment_methods::Entity::delete_by_id(stale.id)
                    .exec(&db_tx)
                    .await?;
            }

            for row in submitted {
                let name = row.name.trim();
                match existing.iter().find(|model| model.name == name) {
                    Some(model) => {
                        let mut update: payment_methods::ActiveModel = model.clone().into();
                        update.kind = ActiveValue::Set(row.kind.as_str().to_string());
                        update.update(&db_tx).await?;
                    }
                    None => {
                        let method = payment_methods::ActiveModel {
                            id: ActiveValue::NotSet,
                            name: ActiveValue::Set(name.to_string()),
                            kind: ActiveValue::Set(row.kind.as_str().to_string()),
                            owner: ActiveValue::Set(Some(owner.to_string())),
                            is_default: ActiveValue::Set(false),
                            created_at: ActiveValue::Set(at),
                        };
                        method.insert(&db_tx).await?;
                    }
                }
            }
            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(owner = %owner, "synced payment methods");
        Ok(())
    }

    /// Replaces the owner's budgets with the submitted grid.
    ///
    /// Budgets carry no cross-references, so this is a plain delete and
    /// reinsert. A row whose category name resolves to nothing (among the
    /// owner's categories plus globals) is dropped silently, matching how the
    /// grid editor has always treated rows left over after a category rename.
    pub async fn sync_budgets(
        &self,
        owner: &str,
        rows: &[BudgetRow],
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner).await?;

            budgets::Entity::delete_many()
                .filter(budgets::Column::Owner.eq(owner))
                .exec(&db_tx)
                .await?;

            for row in rows {
                let name = row.category.trim();
                if name.is_empty() {
                    continue;
                }
                let category = categories::Entity::find()
                    .filter(categories::Column::Name.eq(name))
                    .filter(
                        Condition::any()
                            .add(categories::Column::Owner.eq(owner))
                            .add(categories::Column::Owner.is_null()),
                    )
                    .one(&db_tx)
                    .await?;
                let Some(category) = category else {
                    tracing::warn!(owner = %owner, category = %name, "dropping budget for unknown category");
                    continue;
                };

                let budget = budgets::ActiveModel {
                    id: ActiveValue::NotSet,
                    owner: ActiveValue::Set(owner.to_string()),
                    category_id: ActiveValue::Set(category.id),
                    amount: ActiveValue::Set(row.amount),
                    period: ActiveValue::Set(row.period.as_str().to_string()),
                    is_active: ActiveValue::Set(true),
                    created_at: ActiveValue::Set(at),
                };
                budget.insert(&db_tx).await?;
            }
            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(owner = %owner, "synced budgets");
        Ok(())
    }

    /// Categories visible to the owner: their own rows plus globals.
    pub async fn categories_for(&self, owner: &str) -> ResultEngine<Vec<CategoryRecord>> {
        let models = categories::Entity::find()
            .filter(
                Condition::any()
                    .add(categories::Column::Owner.eq(owner))
                    .add(categories::Column::Owner.is_null()),
            )
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        models
            .into_iter()
            .map(|model| {
                Ok(CategoryRecord {
                    id: model.id,
                    name: model.name,
                    kind: EntryKind::try_from(model.kind.as_str())?,
                    icon: model.icon,
                    color: model.color,
                    is_default: model.is_default,
                })
            })
            .collect()
    }

    /// Payment methods visible to the owner: their own rows plus globals.
    pub async fn payment_methods_for(&self, owner: &str) -> ResultEngine<Vec<MethodRecord>> {
        let models = payment_methods::Entity::find()
            .filter(
                Condition::any()
                    .add(payment_methods::Column::Owner.eq(owner))
                    .add(payment_methods::Column::Owner.is_null()),
            )
            .order_by_asc(payment_methods::Column::Name)
            .all(&self.database)
            .await?;

        models
            .into_iter()
            .map(|model| {
                Ok(MethodRecord {
                    id: model.id,
                    name: model.name,
                    kind: MethodKind::try_from(model.kind.as_str())?,
                    is_default: model.is_default,
                })
            })
            .collect()
    }

    /// The owner's active budgets, joined with their category names.
    pub async fn budgets_for(&self, owner: &str) -> ResultEngine<Vec<BudgetRecord>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::Owner.eq(owner))
            .filter(budgets::Column::IsActive.eq(true))
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;

        models
            .into_iter()
            .map(|(budget, category)| {
                Ok(BudgetRecord {
                    id: budget.id,
                    category: category.map(|c| c.name).unwrap_or_default(),
                    amount: budget.amount,
                    period: BudgetPeriod::try_from(budget.period.as_str())?,
                })
            })
            .collect()
    }
}
