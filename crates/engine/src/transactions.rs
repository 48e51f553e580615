//! Ledger entry primitives.
//!
//! A `LedgerEntry` is one persisted row. A purchase in N instalments becomes N
//! rows sharing a `purchase_id`; a shared expense becomes one payer row (full
//! amount, `is_shared`) whose debtor shares live in `expense_splits`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidName(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

/// One row of the ledger, amounts always positive with the sign implied by
/// `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub owner: String,
    pub category_id: i32,
    pub payment_method_id: Option<i32>,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EntryKind,
    pub details: Option<String>,
    pub installments_paid: i32,
    pub installments_total: i32,
    pub purchase_id: Option<Uuid>,
    pub is_shared: bool,
    pub group_id: Option<Uuid>,
    pub original_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub category_id: i32,
    pub payment_method_id: Option<i32>,
    pub date: Date,
    pub amount: f64,
    pub kind: String,
    pub details: Option<String>,
    pub installments_paid: i32,
    pub installments_total: i32,
    pub purchase_id: Option<String>,
    pub is_shared: bool,
    pub group_id: Option<String>,
    pub original_amount: Option<f64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::payment_methods::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_methods::Column::Id"
    )]
    PaymentMethods,
    #[sea_orm(
        belongs_to = "super::expense_groups::Entity",
        from = "Column::GroupId",
        to = "super::expense_groups::Column::Id"
    )]
    ExpenseGroups,
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    Splits,
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::payment_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethods.def()
    }
}

impl Related<super::expense_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            owner: ActiveValue::Set(entry.owner.clone()),
            category_id: ActiveValue::Set(entry.category_id),
            payment_method_id: ActiveValue::Set(entry.payment_method_id),
            date: ActiveValue::Set(entry.date),
            amount: ActiveValue::Set(entry.amount),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            details: ActiveValue::Set(entry.details.clone()),
            installments_paid: ActiveValue::Set(entry.installments_paid),
            installments_total: ActiveValue::Set(entry.installments_total),
            purchase_id: ActiveValue::Set(entry.purchase_id.map(|id| id.to_string())),
            is_shared: ActiveValue::Set(entry.is_shared),
            group_id: ActiveValue::Set(entry.group_id.map(|id| id.to_string())),
            original_amount: ActiveValue::Set(entry.original_amount),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("transaction not exists".to_string()))?,
            owner: model.owner,
            category_id: model.category_id,
            payment_method_id: model.payment_method_id,
            date: model.date,
            amount: model.amount,
            kind: EntryKind::try_from(model.kind.as_str())?,
            details: model.details,
            installments_paid: model.installments_paid,
            installments_total: model.installments_total,
            purchase_id: model.purchase_id.and_then(|s| Uuid::parse_str(&s).ok()),
            is_shared: model.is_shared,
            group_id: model.group_id.and_then(|s| Uuid::parse_str(&s).ok()),
            original_amount: model.original_amount,
            created_at: model.created_at,
        })
    }
}
