//! Per-user presentation defaults (currency, date format, theme).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub username: String,
    pub currency: String,
    pub date_format: String,
    pub theme: String,
    pub budget_alerts: bool,
    /// Free-form extras the dashboard may stash without a schema change.
    pub extra: Option<serde_json::Value>,
}

impl UserSettings {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            currency: "EUR".to_string(),
            date_format: "DD/MM/YYYY".to_string(),
            theme: "light".to_string(),
            budget_alerts: true,
            extra: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub currency: String,
    pub date_format: String,
    pub theme: String,
    pub budget_alerts: bool,
    pub extra: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&UserSettings> for ActiveModel {
    fn from(settings: &UserSettings) -> Self {
        Self {
            username: ActiveValue::Set(settings.username.clone()),
            currency: ActiveValue::Set(settings.currency.clone()),
            date_format: ActiveValue::Set(settings.date_format.clone()),
            theme: ActiveValue::Set(settings.theme.clone()),
            budget_alerts: ActiveValue::Set(settings.budget_alerts),
            extra: ActiveValue::Set(settings.extra.clone()),
        }
    }
}

impl From<Model> for UserSettings {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
            currency: model.currency,
            date_format: model.date_format,
            theme: model.theme,
            budget_alerts: model.budget_alerts,
            extra: model.extra,
        }
    }
}
