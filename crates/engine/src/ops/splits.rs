use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{
    EngineError, EntryKind, GroupRef, ResultEngine, SharedExpenseCmd, SplitSpec, SplitStatus,
    expense_groups, expense_splits, group_members,
    transactions::{self, LedgerEntry},
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Creates an expense group with the given members.
    ///
    /// The creator is always enrolled, listed or not.
    pub async fn create_expense_group(
        &self,
        name: &str,
        description: Option<&str>,
        created_by: &str,
        members: &[String],
        at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "group")?;
        let description = normalize_optional_text(description);

        let group_id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, created_by).await?;
            let group = expense_groups::ActiveModel {
                id: ActiveValue::Set(group_id.to_string()),
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(description.clone()),
                created_by: ActiveValue::Set(created_by.to_string()),
                created_at: ActiveValue::Set(at),
                is_active: ActiveValue::Set(true),
            };
            group.insert(&db_tx).await?;

            self.enroll_members(&db_tx, group_id, created_by, members, at)
                .await?;
            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(group = %group_id, creator = %created_by, "created expense group");
        Ok(group_id)
    }

    /// Records a shared expense.
    ///
    /// The payer gets exactly one ledger row carrying the full outflow
    /// (`amount = original_amount = total`); every other participant gets one
    /// pending split row for their share. Equal splits divide the total by the
    /// participant count with the payer included; explicit shares are stored
    /// verbatim, and a mismatch against the total is logged, never rejected.
    /// Returns the payer transaction's id.
    pub async fn add_shared_expense(&self, cmd: SharedExpenseCmd) -> ResultEngine<Uuid> {
        if cmd.total <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "total must be > 0".to_string(),
            ));
        }
        let category = normalize_required_name(&cmd.category, "category")?;

        let mut participants: BTreeSet<String> = cmd.participants.iter().cloned().collect();
        participants.insert(cmd.payer.clone());
        if let SplitSpec::Explicit(shares) = &cmd.split {
            participants.extend(shares.iter().map(|(debtor, _)| debtor.clone()));
        }

        let discrepancy = cmd.discrepancy();
        if discrepancy.abs() > 1e-9 {
            tracing::warn!(
                payer = %cmd.payer,
                discrepancy,
                "explicit shares do not sum to the total"
            );
        }

        let transaction_id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.payer).await?;
            let category_id = self
                .resolve_category(&db_tx, &cmd.payer, &category, EntryKind::Expense)
                .await?;
            let payment_method_id = self
                .resolve_payment_method(&db_tx, &cmd.payer, cmd.payment_method.as_deref())
                .await?;

            let group_id = match &cmd.group {
                GroupRef::Existing(id) => {
                    expense_groups::Entity::find_by_id(id.to_string())
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::NotFound(format!("group {id}")))?;
                    *id
                }
                GroupRef::New { name, description } => {
                    let name = normalize_required_name(name, "group")?;
                    let group_id = Uuid::new_v4();
                    let group = expense_groups::ActiveModel {
                        id: ActiveValue::Set(group_id.to_string()),
                        name: ActiveValue::Set(name),
                        description: ActiveValue::Set(description.clone()),
                        created_by: ActiveValue::Set(cmd.payer.clone()),
                        created_at: ActiveValue::Set(cmd.created_at),
                        is_active: ActiveValue::Set(true),
                    };
                    group.insert(&db_tx).await?;
                    let members: Vec<String> = participants.iter().cloned().collect();
                    self.enroll_members(&db_tx, group_id, &cmd.payer, &members, cmd.created_at)
                        .await?;
                    group_id
                }
            };

            let entry = LedgerEntry {
                id: transaction_id,
                owner: cmd.payer.clone(),
                category_id,
                payment_method_id,
                date: cmd.date,
                amount: cmd.total,
                kind: EntryKind::Expense,
                details: cmd.details.clone(),
                installments_paid: 1,
                installments_total: 1,
                purchase_id: None,
                is_shared: true,
                group_id: Some(group_id),
                original_amount: Some(cmd.total),
                created_at: cmd.created_at,
            };
            transactions::ActiveModel::from(&entry).insert(&db_tx).await?;

            let shares: Vec<(String, f64)> = match &cmd.split {
                SplitSpec::Equal => {
                    let per_head = cmd.total / participants.len() as f64;
                    participants
                        .iter()
                        .filter(|debtor| *debtor != &cmd.payer)
                        .map(|debtor| (debtor.clone(), per_head))
                        .collect()
                }
                SplitSpec::Explicit(shares) => shares
                    .iter()
                    .filter(|(debtor, _)| debtor != &cmd.payer)
                    .cloned()
                    .collect(),
            };

            for (debtor, amount) in shares {
                self.require_user(&db_tx, &debtor).await?;
                let split = expense_splits::ActiveModel {
                    id: ActiveValue::NotSet,
                    transaction_id: ActiveValue::Set(transaction_id.to_string()),
                    debtor: ActiveValue::Set(debtor),
                    amount: ActiveValue::Set(amount),
                    percentage: ActiveValue::Set(Some(amount / cmd.total * 100.0)),
                    status: ActiveValue::Set(SplitStatus::Pending.as_str().to_string()),
                    paid_at: ActiveValue::Set(None),
                    notes: ActiveValue::Set(None),
                    created_at: ActiveValue::Set(cmd.created_at),
                };
                split.insert(&db_tx).await?;
            }

            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(
            payer = %cmd.payer,
            transaction = %transaction_id,
            "recorded shared expense"
        );
        Ok(transaction_id)
    }

    /// Marks a split as paid and stamps the settlement time.
    ///
    /// Settling an already-paid split is a no-op apart from refreshing
    /// `paid_at`.
    pub async fn settle_split(&self, split_id: i32, paid_at: DateTime<Utc>) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            expense_splits::Entity::find_by_id(split_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("split {split_id}")))?;

            let split = expense_splits::ActiveModel {
                id: ActiveValue::Set(split_id),
                status: ActiveValue::Set(SplitStatus::Paid.as_str().to_string()),
                paid_at: ActiveValue::Set(Some(paid_at)),
                ..Default::default()
            };
            split.update(&db_tx).await?;
            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(split = split_id, "settled split");
        Ok(())
    }

    async fn enroll_members(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: Uuid,
        creator: &str,
        members: &[String],
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let mut enrolled: BTreeSet<String> = members.iter().cloned().collect();
        enrolled.insert(creator.to_string());

        for member in enrolled {
            self.require_user(db_tx, &member).await?;
            let row = group_members::ActiveModel {
                id: ActiveValue::NotSet,
                group_id: ActiveValue::Set(group_id.to_string()),
                member: ActiveValue::Set(member),
                joined_at: ActiveValue::Set(at),
                is_active: ActiveValue::Set(true),
            };
            row.insert(db_tx).await?;
        }
        Ok(())
    }
}
