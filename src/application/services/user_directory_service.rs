use crate::application::ports::auth_gateway::AuthGateway;
use crate::application::ports::notifier::Notifier;
use crate::application::ports::repositories::{ProfileRepository, ProfileUpdate};
use crate::domain::entities::{Profile, ProfileWithEmail};
use crate::domain::value_objects::{CacheKey, UserId};
use crate::infrastructure::cache::{QueryCache, QueryState};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::info;

/// 会員ディレクトリのアプリケーションサービス。
///
/// 他人のプロフィール更新は Admin / Staff のみ許可する。
pub struct UserDirectoryService {
    auth: Arc<dyn AuthGateway>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn Notifier>,
    list_cache: Arc<QueryCache<Vec<Profile>>>,
    profile_cache: Arc<QueryCache<Profile>>,
}

impl UserDirectoryService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn Notifier>,
        list_cache: Arc<QueryCache<Vec<Profile>>>,
        profile_cache: Arc<QueryCache<Profile>>,
    ) -> Self {
        Self {
            auth,
            profiles,
            notifier,
            list_cache,
            profile_cache,
        }
    }

    /// 全プロフィールを `updated_at` の新しい順で返す。
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let key = CacheKey::profiles();
        loop {
            if let QueryState::Settled(profiles) = self.list_cache.read(&key) {
                if !self.list_cache.is_stale(&key) {
                    return Ok(profiles);
                }
            }

            match self.list_cache.begin_fetch(&key) {
                Some(token) => match self.profiles.list_profiles().await {
                    Ok(profiles) => {
                        self.list_cache.complete_fetch(&key, token, profiles.clone());
                        return Ok(profiles);
                    }
                    Err(err) => {
                        self.list_cache.fail_fetch(&key, token);
                        return Err(err);
                    }
                },
                None => self.list_cache.wait_for_idle(&key).await,
            }
        }
    }

    /// ログイン中ユーザーのプロフィール。メールはセッションから補完。
    pub async fn current_profile(&self) -> Result<ProfileWithEmail, AppError> {
        let user = self
            .auth
            .current_user()
            .await?
            .ok_or_else(|| AppError::Unauthorized("login required".into()))?;

        let key = CacheKey::profile(&user.id);
        loop {
            if let QueryState::Settled(profile) = self.profile_cache.read(&key) {
                if !self.profile_cache.is_stale(&key) {
                    return Ok(ProfileWithEmail {
                        profile,
                        email: user.email,
                    });
                }
            }

            match self.profile_cache.begin_fetch(&key) {
                Some(token) => match self.profiles.get_profile(&user.id).await {
                    Ok(Some(profile)) => {
                        self.profile_cache
                            .complete_fetch(&key, token, profile.clone());
                        return Ok(ProfileWithEmail {
                            profile,
                            email: user.email,
                        });
                    }
                    Ok(None) => {
                        self.profile_cache.fail_fetch(&key, token);
                        return Err(AppError::NotFound("Profile not found".into()));
                    }
                    Err(err) => {
                        self.profile_cache.fail_fetch(&key, token);
                        return Err(err);
                    }
                },
                None => self.profile_cache.wait_for_idle(&key).await,
            }
        }
    }

    /// 対象ユーザーのプロフィールを更新する。Admin / Staff のみ。
    pub async fn update_profile(
        &self,
        target: &UserId,
        update: ProfileUpdate,
    ) -> Result<(), AppError> {
        match self.try_update_profile(target, &update).await {
            Ok(()) => {
                self.list_cache.invalidate(&CacheKey::profiles());
                self.profile_cache.invalidate(&CacheKey::profile(target));
                self.notifier.success("Profile updated successfully").await;
                info!("Updated profile: {}", target);
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .failure(&format!("Failed to update profile: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    async fn try_update_profile(
        &self,
        target: &UserId,
        update: &ProfileUpdate,
    ) -> Result<(), AppError> {
        let user = self
            .auth
            .current_user()
            .await?
            .ok_or_else(|| AppError::Unauthorized("login required".into()))?;

        let acting_profile = self
            .profiles
            .get_profile(&user.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("could not verify permissions".into()))?;

        if !acting_profile.account_type.can_manage_directory() {
            return Err(AppError::Unauthorized(
                "only admins or staff can update profiles".into(),
            ));
        }

        self.profiles.update_profile(target, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::auth_gateway::AuthUser;
    use crate::domain::value_objects::AccountType;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;

    mock! {
        pub Auth {}

        #[async_trait]
        impl AuthGateway for Auth {
            async fn current_user(&self) -> Result<Option<AuthUser>, AppError>;
        }
    }

    mock! {
        pub Profiles {}

        #[async_trait]
        impl ProfileRepository for Profiles {
            async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, AppError>;
            async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;
            async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<(), AppError>;
        }
    }

    mock! {
        pub Toast {}

        #[async_trait]
        impl Notifier for Toast {
            async fn success(&self, message: &str);
            async fn failure(&self, message: &str);
        }
    }

    fn profile_with(account_type: AccountType) -> Profile {
        Profile {
            id: UserId::new("u1".to_string()).unwrap(),
            firstname: Some("Ayaka".to_string()),
            lastname: Some("Sato".to_string()),
            avatar_url: None,
            account_type,
            updated_at: Utc::now(),
        }
    }

    fn auth_as(user_id: &str) -> MockAuth {
        let id = UserId::new(user_id.to_string()).unwrap();
        let mut auth = MockAuth::new();
        auth.expect_current_user().returning(move || {
            Ok(Some(AuthUser {
                id: id.clone(),
                email: Some("me@example.com".to_string()),
            }))
        });
        auth
    }

    fn quiet_toast() -> MockToast {
        let mut toast = MockToast::new();
        toast.expect_success().returning(|_| ());
        toast.expect_failure().returning(|_| ());
        toast
    }

    fn service(auth: MockAuth, profiles: MockProfiles, toast: MockToast) -> UserDirectoryService {
        UserDirectoryService::new(
            Arc::new(auth),
            Arc::new(profiles),
            Arc::new(toast),
            Arc::new(QueryCache::new()),
            Arc::new(QueryCache::new()),
        )
    }

    #[tokio::test]
    async fn staff_can_update_other_profiles() {
        let auth = auth_as("u1");
        let mut profiles = MockProfiles::new();
        profiles
            .expect_get_profile()
            .returning(|_| Ok(Some(profile_with(AccountType::Staff))));
        profiles
            .expect_update_profile()
            .times(1)
            .withf(|id, update| id.as_str() == "u2" && update.firstname.as_deref() == Some("Ren"))
            .returning(|_, _| Ok(()));
        let service = service(auth, profiles, quiet_toast());

        let target = UserId::new("u2".to_string()).unwrap();
        let update = ProfileUpdate {
            firstname: Some("Ren".to_string()),
            ..ProfileUpdate::default()
        };
        service.update_profile(&target, update).await.unwrap();
        assert!(service.list_cache.is_stale(&CacheKey::profiles()));
    }

    #[tokio::test]
    async fn member_cannot_update_other_profiles() {
        let auth = auth_as("u1");
        let mut profiles = MockProfiles::new();
        profiles
            .expect_get_profile()
            .returning(|_| Ok(Some(profile_with(AccountType::Member))));
        let service = service(auth, profiles, quiet_toast());

        let target = UserId::new("u2".to_string()).unwrap();
        let result = service.update_profile(&target, ProfileUpdate::default()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert_eq!(
            service.list_cache.invalidation_count(&CacheKey::profiles()),
            0
        );
    }

    #[tokio::test]
    async fn current_profile_includes_session_email() {
        let auth = auth_as("u1");
        let mut profiles = MockProfiles::new();
        profiles
            .expect_get_profile()
            .times(1)
            .returning(|_| Ok(Some(profile_with(AccountType::Member))));
        let service = service(auth, profiles, quiet_toast());

        let me = service.current_profile().await.unwrap();
        assert_eq!(me.email.as_deref(), Some("me@example.com"));

        // 2 回目はキャッシュから返る（times(1)）
        let me = service.current_profile().await.unwrap();
        assert_eq!(me.profile.id.as_str(), "u1");
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let auth = auth_as("u1");
        let mut profiles = MockProfiles::new();
        profiles.expect_get_profile().returning(|_| Ok(None));
        let service = service(auth, profiles, quiet_toast());

        let result = service.current_profile().await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
