use crate::application::ports::auth_gateway::AuthGateway;
use crate::application::ports::repositories::FavoriteRepository;
use crate::domain::entities::Book;
use crate::domain::value_objects::CacheKey;
use crate::infrastructure::cache::{QueryCache, QueryState};
use crate::shared::error::AppError;
use std::sync::Arc;

/// お気に入り書籍一覧のアプリケーションサービス。
///
/// 個別トグルとは違い、未ログインはエラー。一覧は `favorites-list`
/// キーでキャッシュされ、トグルの settle による無効化で再読込される。
pub struct FavoritesListService {
    auth: Arc<dyn AuthGateway>,
    favorites: Arc<dyn FavoriteRepository>,
    list_cache: Arc<QueryCache<Vec<Book>>>,
}

impl FavoritesListService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        favorites: Arc<dyn FavoriteRepository>,
        list_cache: Arc<QueryCache<Vec<Book>>>,
    ) -> Self {
        Self {
            auth,
            favorites,
            list_cache,
        }
    }

    /// `favorited = true` の書籍を返す。
    pub async fn list_favorited_books(&self) -> Result<Vec<Book>, AppError> {
        let user = self
            .auth
            .current_user()
            .await?
            .ok_or_else(|| AppError::Unauthorized("login required to view favorites".into()))?;

        let key = CacheKey::favorites_list();
        loop {
            if let QueryState::Settled(books) = self.list_cache.read(&key) {
                if !self.list_cache.is_stale(&key) {
                    return Ok(books);
                }
            }

            match self.list_cache.begin_fetch(&key) {
                Some(token) => match self.favorites.list_favorited_books(&user.id).await {
                    Ok(books) => {
                        self.list_cache.complete_fetch(&key, token, books.clone());
                        return Ok(books);
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::auth_gateway::AuthUser;
    use crate::domain::entities::Favorite;
    use crate::domain::value_objects::{BookId, UserId};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Auth {}

        #[async_trait]
        impl AuthGateway for Auth {
            async fn current_user(&self) -> Result<Option<AuthUser>, AppError>;
        }
    }

    mock! {
        pub Favorites {}

        #[async_trait]
        impl FavoriteRepository for Favorites {
            async fn find_favorite(
                &self,
                user_id: &UserId,
                book_id: &BookId,
            ) -> Result<Option<Favorite>, AppError>;

            async fn upsert_favorite(
                &self,
                user_id: &UserId,
                book_id: &BookId,
                favorited: bool,
            ) -> Result<(), AppError>;

            async fn list_favorited_books(
                &self,
                user_id: &UserId,
            ) -> Result<Vec<Book>, AppError>;
        }
    }

    fn sample_book() -> Book {
        Book::new(
            "Kafka on the Shore".to_string(),
            "Haruki Murakami".to_string(),
            None,
            None,
            UserId::new("u1".to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn anonymous_listing_is_an_error() {
        let mut auth = MockAuth::new();
        auth.expect_current_user().returning(|| Ok(None));
        let favorites = MockFavorites::new();
        let service =
            FavoritesListService::new(Arc::new(auth), Arc::new(favorites), Arc::new(QueryCache::new()));

        let result = service.list_favorited_books().await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn invalidation_forces_refetch() {
        let mut auth = MockAuth::new();
        auth.expect_current_user().returning(|| {
            Ok(Some(AuthUser {
                id: UserId::new("u1".to_string()).unwrap(),
                email: None,
            }))
        });
        let mut favorites = MockFavorites::new();
        favorites
            .expect_list_favorited_books()
            .times(2)
            .returning(|_| Ok(vec![sample_book()]));
        let cache = Arc::new(QueryCache::new());
        let service =
            FavoritesListService::new(Arc::new(auth), Arc::new(favorites), Arc::clone(&cache));

        let first = service.list_favorited_books().await.unwrap();
        assert_eq!(first.len(), 1);
        // キャッシュヒット
        service.list_favorited_books().await.unwrap();

        // トグル settle 相当の無効化で再読込される（times(2)）
        cache.invalidate(&CacheKey::favorites_list());
        service.list_favorited_books().await.unwrap();
    }
}
