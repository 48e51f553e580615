//! Onboarding progress and per-user settings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{ResultEngine, UserSettings, tutorial_progress, user_settings};

use super::{Engine, with_tx};

impl Engine {
    /// Completion state per tutorial step for `username`. Steps never touched
    /// are simply absent from the map.
    pub async fn tutorial_progress(
        &self,
        username: &str,
    ) -> ResultEngine<HashMap<String, bool>> {
        let rows = tutorial_progress::Entity::find()
            .filter(tutorial_progress::Column::Username.eq(username))
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.step_name, row.completed))
            .collect())
    }

    /// Upserts one tutorial step. Completing a step stamps `completed_at`;
    /// un-completing clears it.
    pub async fn set_tutorial_step(
        &self,
        username: &str,
        step: &str,
        completed: bool,
        at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, username).await?;
            let completed_at = completed.then_some(at);
            let existing = tutorial_progress::Entity::find()
                .filter(tutorial_progress::Column::Username.eq(username))
                .filter(tutorial_progress::Column::StepName.eq(step))
                .one(&db_tx)
                .await?;
            match existing {
                Some(model) => {
                    let mut update: tutorial_progress::ActiveModel = model.into();
                    update.completed = ActiveValue::Set(completed);
                    update.completed_at = ActiveValue::Set(completed_at);
                    update.update(&db_tx).await?;
                }
                None => {
                    let row = tutorial_progress::ActiveModel {
                        id: ActiveValue::NotSet,
                        username: ActiveValue::Set(username.to_string()),
                        step_name: ActiveValue::Set(step.to_string()),
                        completed: ActiveValue::Set(completed),
                        completed_at: ActiveValue::Set(completed_at),
                    };
                    row.insert(&db_tx).await?;
                }
            }
            Ok(())
        })?;

        self.bump_revision();
        Ok(())
    }

    /// The stored settings for `username`, if any were ever saved.
    pub async fn user_settings(&self, username: &str) -> ResultEngine<Option<UserSettings>> {
        let model = user_settings::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(UserSettings::from))
    }

    /// Upserts the user's settings row.
    pub async fn save_user_settings(&self, settings: &UserSettings) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &settings.username).await?;
            let active = user_settings::ActiveModel::from(settings);
            let existing = user_settings::Entity::find_by_id(settings.username.clone())
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                active.update(&db_tx).await?;
            } else {
                active.insert(&db_tx).await?;
            }
            Ok(())
        })?;

        self.bump_revision();
        Ok(())
    }
}
