//! Payment method registry, same scoping rules as categories.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Cash,
    DebitCard,
    CreditCard,
    Transfer,
    DigitalWallet,
}

impl MethodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::DebitCard => "debit_card",
            Self::CreditCard => "credit_card",
            Self::Transfer => "transfer",
            Self::DigitalWallet => "digital_wallet",
        }
    }
}

impl TryFrom<&str> for MethodKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "debit_card" => Ok(Self::DebitCard),
            "credit_card" => Ok(Self::CreditCard),
            "transfer" => Ok(Self::Transfer),
            "digital_wallet" => Ok(Self::DigitalWallet),
            other => Err(EngineError::InvalidName(format!(
                "invalid payment method kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub owner: Option<String>,
    pub is_default: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl ActiveModelBehavior for ActiveModel {}
