use super::SqliteStore;
use super::queries::{SELECT_PROFILES, SELECT_PROFILE_BY_ID, UPDATE_PROFILE};
use crate::application::ports::repositories::{ProfileRepository, ProfileUpdate};
use crate::domain::entities::Profile;
use crate::domain::value_objects::{AccountType, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    firstname: Option<String>,
    lastname: Option<String>,
    avatar_url: Option<String>,
    account_type: String,
    updated_at: i64,
}

impl ProfileRow {
    fn into_domain(self) -> Result<Profile, AppError> {
        let id = UserId::new(self.id)
            .map_err(|err| AppError::ValidationError(format!("Invalid UserId: {err}")))?;
        let updated_at = Utc
            .timestamp_millis_opt(self.updated_at)
            .single()
            .ok_or_else(|| AppError::ValidationError("Invalid timestamp".to_string()))?;

        Ok(Profile {
            id,
            firstname: self.firstname,
            lastname: self.lastname,
            avatar_url: self.avatar_url,
            account_type: AccountType::from(self.account_type.as_str()),
            updated_at,
        })
    }
}

#[async_trait]
impl ProfileRepository for SqliteStore {
    async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(ProfileRow::into_domain).transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let rows = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILES)
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.into_iter().map(ProfileRow::into_domain).collect()
    }

    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<(), AppError> {
        let result = sqlx::query(UPDATE_PROFILE)
            .bind(id.as_str())
            .bind(&update.firstname)
            .bind(&update.lastname)
            .bind(&update.avatar_url)
            .bind(&update.account_type)
            .bind(Utc::now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile not found: {id}")));
        }
        Ok(())
    }
}
