use chrono::Months;
use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    EngineError, RecordTransactionCmd, ResultEngine,
    transactions::{self, LedgerEntry},
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Records a purchase, expanding it into one ledger row per instalment.
    ///
    /// Row `i` (0-based) is dated `starts_on + i months` (clamping rollover:
    /// Jan 31 + 1 month lands on the last day of February) and carries
    /// `amount = total / installments`, plain division with no remainder
    /// folded into the last instalment. All rows share one freshly generated
    /// purchase key, returned to the caller, and commit atomically.
    pub async fn record_transaction(&self, cmd: RecordTransactionCmd) -> ResultEngine<Uuid> {
        if cmd.amount <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        if cmd.installments == 0 {
            return Err(EngineError::InvalidAmount(
                "installments must be >= 1".to_string(),
            ));
        }
        let category = normalize_required_name(&cmd.category, "category")?;

        let purchase_id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.owner).await?;
            let category_id = self
                .resolve_category(&db_tx, &cmd.owner, &category, cmd.kind)
                .await?;
            let payment_method_id = self
                .resolve_payment_method(&db_tx, &cmd.owner, cmd.payment_method.as_deref())
                .await?;

            let per_installment = cmd.amount / f64::from(cmd.installments);
            for i in 0..cmd.installments {
                let date = cmd
                    .starts_on
                    .checked_add_months(Months::new(i))
                    .ok_or_else(|| {
                        EngineError::InvalidAmount("instalment date out of range".to_string())
                    })?;
                let entry = LedgerEntry {
                    id: Uuid::new_v4(),
                    owner: cmd.owner.clone(),
                    category_id,
                    payment_method_id,
                    date,
                    amount: per_installment,
                    kind: cmd.kind,
                    details: cmd.details.clone(),
                    installments_paid: i as i32 + 1,
                    installments_total: cmd.installments as i32,
                    purchase_id: Some(purchase_id),
                    is_shared: false,
                    group_id: None,
                    original_amount: None,
                    created_at: cmd.created_at,
                };
                transactions::ActiveModel::from(&entry).insert(&db_tx).await?;
            }
            Ok(())
        })?;

        self.bump_revision();
        tracing::info!(
            owner = %cmd.owner,
            purchase = %purchase_id,
            installments = cmd.installments,
            "recorded transaction"
        );
        Ok(purchase_id)
    }
}
