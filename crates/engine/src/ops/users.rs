use chrono::{DateTime, Utc};

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, EntryKind, MethodKind, ResultEngine, categories, payment_methods, users,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// Catalog rows seeded once, visible to every user (`owner = NULL`).
const DEFAULT_CATEGORIES: &[(&str, EntryKind, &str, &str)] = &[
    ("Groceries", EntryKind::Expense, "🍽️", "#FF6B6B"),
    ("Transport", EntryKind::Expense, "🚗", "#4ECDC4"),
    ("Entertainment", EntryKind::Expense, "🎬", "#45B7D1"),
    ("Health", EntryKind::Expense, "🏥", "#96CEB4"),
    ("Education", EntryKind::Expense, "📚", "#FFEAA7"),
    ("Home", EntryKind::Expense, "🏠", "#DDA0DD"),
    ("Clothing", EntryKind::Expense, "👕", "#98D8C8"),
    ("Salary", EntryKind::Income, "💰", "#6C5CE7"),
    ("Freelance", EntryKind::Income, "💻", "#A29BFE"),
    ("Investments", EntryKind::Income, "📈", "#FD79A8"),
];

const DEFAULT_METHODS: &[(&str, MethodKind)] = &[
    ("Cash", MethodKind::Cash),
    ("Debit card", MethodKind::DebitCard),
    ("Credit card", MethodKind::CreditCard),
    ("Bank transfer", MethodKind::Transfer),
    ("Digital wallet", MethodKind::DigitalWallet),
];

impl Engine {
    /// Creates the user row on first login.
    ///
    /// An existing row is left untouched (the identity provider may hand us
    /// the same user many times). Returns whether a row was created.
    pub async fn ensure_user(
        &self,
        username: &str,
        name: &str,
        email: Option<&str>,
        at: DateTime<Utc>,
    ) -> ResultEngine<bool> {
        let username = normalize_required_name(username, "user")?;
        let name = normalize_required_name(name, "display")?;
        let email = normalize_optional_text(email);

        let created = with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                Ok(false)
            } else {
                let user = users::ActiveModel {
                    username: ActiveValue::Set(username.clone()),
                    name: ActiveValue::Set(name),
                    email: ActiveValue::Set(email),
                    created_at: ActiveValue::Set(at),
                    is_active: ActiveValue::Set(true),
                };
                user.insert(&db_tx).await?;
                Ok(true)
            }
        })?;

        if created {
            self.bump_revision();
            tracing::info!(user = %username, "created user");
        }
        Ok(created)
    }

    /// Seeds the global default categories and payment methods.
    ///
    /// Safe to call on every startup: names already present are skipped.
    pub async fn seed_default_catalog(&self, at: DateTime<Utc>) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            for (name, kind, icon, color) in DEFAULT_CATEGORIES {
                let existing = categories::Entity::find()
                    .filter(categories::Column::Name.eq(*name))
                    .filter(categories::Column::Owner.is_null())
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    continue;
                }
                let category = categories::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set((*name).to_string()),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                    icon: ActiveValue::Set(Some((*icon).to_string())),
                    color: ActiveValue::Set(Some((*color).to_string())),
                    owner: ActiveValue::Set(None),
                    is_default: ActiveValue::Set(true),
                    created_at: ActiveValue::Set(at),
                };
                category.insert(&db_tx).await?;
            }

            for (name, kind) in DEFAULT_METHODS {
                let existing = payment_methods::Entity::find()
                    .filter(payment_methods::Column::Name.eq(*name))
                    .filter(payment_methods::Column::Owner.is_null())
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    continue;
                }
                let method = payment_methods::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set((*name).to_string()),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                    owner: ActiveValue::Set(None),
                    is_default: ActiveValue::Set(true),
                    created_at: ActiveValue::Set(at),
                };
                method.insert(&db_tx).await?;
            }

            Ok(())
        })?;

        self.bump_revision();
        Ok(())
    }

    pub(super) async fn require_user(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {username}")))
    }

    /// Resolves a category by exact name among the owner's rows plus globals,
    /// requiring the entry kind to match.
    pub(super) async fn resolve_category(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        name: &str,
        kind: EntryKind,
    ) -> ResultEngine<i32> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .filter(
                Condition::any()
                    .add(categories::Column::Owner.eq(owner))
                    .add(categories::Column::Owner.is_null()),
            )
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("category {name}")))?;
        Ok(model.id)
    }

    /// Resolves a payment method by exact name among the owner's rows plus
    /// globals.
    ///
    /// A name that does not resolve is treated as "no payment method" rather
    /// than an error; the dashboard has always silently dropped stale method
    /// names and existing data relies on it.
    pub(super) async fn resolve_payment_method(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        name: Option<&str>,
    ) -> ResultEngine<Option<i32>> {
        let Some(name) = name.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let model = payment_methods::Entity::find()
            .filter(payment_methods::Column::Name.eq(name))
            .filter(
                Condition::any()
                    .add(payment_methods::Column::Owner.eq(owner))
                    .add(payment_methods::Column::Owner.is_null()),
            )
            .one(db_tx)
            .await?;
        Ok(model.map(|m| m.id))
    }
}
