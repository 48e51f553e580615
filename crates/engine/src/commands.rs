//! Command structs for engine operations.
//!
//! These types group parameters for write operations (record a purchase,
//! record a shared expense, reconcile an edited table), keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{BudgetPeriod, EntryKind, MethodKind};

/// Record an income or expense, optionally spread over N instalments.
#[derive(Clone, Debug)]
pub struct RecordTransactionCmd {
    pub owner: String,
    pub category: String,
    /// Total purchase amount, split evenly across instalments.
    pub amount: f64,
    pub kind: EntryKind,
    pub starts_on: NaiveDate,
    pub installments: u32,
    pub payment_method: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecordTransactionCmd {
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        category: impl Into<String>,
        kind: EntryKind,
        amount: f64,
        starts_on: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner: owner.into(),
            category: category.into(),
            amount,
            kind,
            starts_on,
            installments: 1,
            payment_method: None,
            details: None,
            created_at,
        }
    }

    #[must_use]
    pub fn installments(mut self, installments: u32) -> Self {
        self.installments = installments;
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// How a shared expense is divided among its participants.
#[derive(Clone, Debug)]
pub enum SplitSpec {
    /// Everyone, payer included, owes `total / participant count`.
    Equal,
    /// Caller-supplied `(debtor, amount)` pairs, taken verbatim.
    Explicit(Vec<(String, f64)>),
}

/// Group to attach a shared expense to.
#[derive(Clone, Debug)]
pub enum GroupRef {
    Existing(Uuid),
    New {
        name: String,
        description: Option<String>,
    },
}

/// Record a shared expense: one payer transaction plus one split row per
/// non-payer participant.
#[derive(Clone, Debug)]
pub struct SharedExpenseCmd {
    pub payer: String,
    pub category: String,
    pub total: f64,
    pub date: NaiveDate,
    pub group: GroupRef,
    pub participants: Vec<String>,
    pub split: SplitSpec,
    pub payment_method: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SharedExpenseCmd {
    #[must_use]
    pub fn new(
        payer: impl Into<String>,
        category: impl Into<String>,
        total: f64,
        date: NaiveDate,
        group: GroupRef,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payer: payer.into(),
            category: category.into(),
            total,
            date,
            group,
            participants: Vec::new(),
            split: SplitSpec::Equal,
            payment_method: None,
            details: None,
            created_at,
        }
    }

    #[must_use]
    pub fn participant(mut self, username: impl Into<String>) -> Self {
        self.participants.push(username.into());
        self
    }

    #[must_use]
    pub fn split(mut self, split: SplitSpec) -> Self {
        self.split = split;
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// How far the explicit shares are from covering the total (positive:
    /// undershoot). Advisory only; the engine records explicit shares
    /// verbatim and leaves blocking to the caller.
    #[must_use]
    pub fn discrepancy(&self) -> f64 {
        match &self.split {
            SplitSpec::Equal => 0.0,
            SplitSpec::Explicit(shares) => {
                let assigned: f64 = shares.iter().map(|(_, amount)| amount).sum();
                self.total - assigned
            }
        }
    }
}

/// One row of the category editor grid.
#[derive(Clone, Debug)]
pub struct CategoryRow {
    pub name: String,
    pub kind: EntryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// One row of the payment-method editor grid.
#[derive(Clone, Debug)]
pub struct MethodRow {
    pub name: String,
    pub kind: MethodKind,
}

/// One row of the budget editor grid.
#[derive(Clone, Debug)]
pub struct BudgetRow {
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
}
