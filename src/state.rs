use std::sync::Arc;

use crate::application::ports::notifier::Notifier;
use crate::application::ports::object_storage::ObjectStorage;
use crate::application::services::{
    BookService, FavoriteService, FavoritesListService, UserDirectoryService,
};
use crate::domain::entities::{Book, Profile};
use crate::infrastructure::auth::SessionAuthGateway;
use crate::infrastructure::cache::QueryCache;
use crate::infrastructure::database::{ConnectionPool, Repository, SqliteStore};
use crate::infrastructure::notify::TracingNotifier;
use crate::infrastructure::storage::LocalObjectStorage;
use crate::shared::AppConfig;

/// アプリケーション全体の状態を管理する構造体。
///
/// キャッシュとポート実装をここで一度だけ構築し、各サービスへ
/// コンストラクタ経由で注入する。グローバルなクライアントは持たない。
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<SessionAuthGateway>,
    pub pool: ConnectionPool,
    pub favorite_service: Arc<FavoriteService>,
    pub favorites_list_service: Arc<FavoritesListService>,
    pub book_service: Arc<BookService>,
    pub user_directory_service: Arc<UserDirectoryService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let pool = ConnectionPool::new(
            &config.database.url,
            config.database.max_connections,
        )
        .await?;
        let store = Arc::new(SqliteStore::new(pool.clone()));
        store.initialize().await?;

        let auth = Arc::new(SessionAuthGateway::new());
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
        let object_storage: Arc<dyn ObjectStorage> = Arc::new(LocalObjectStorage::new(
            config.storage.data_dir.join("objects"),
            config.storage.public_base_url.clone(),
        ));

        // 値の形ごとに 1 つのキャッシュを共有する。`books` と
        // `favorites-list` は同じ書籍リストキャッシュの別キー。
        let status_cache = Arc::new(QueryCache::<bool>::new());
        let book_list_cache = Arc::new(QueryCache::<Vec<Book>>::new());
        let profile_list_cache = Arc::new(QueryCache::<Vec<Profile>>::new());
        let profile_cache = Arc::new(QueryCache::<Profile>::new());

        let favorite_service = Arc::new(FavoriteService::new(
            auth.clone(),
            store.clone(),
            status_cache,
            book_list_cache.clone(),
        ));
        let favorites_list_service = Arc::new(FavoritesListService::new(
            auth.clone(),
            store.clone(),
            book_list_cache.clone(),
        ));
        let book_service = Arc::new(BookService::new(
            auth.clone(),
            store.clone(),
            object_storage,
            notifier.clone(),
            book_list_cache,
        ));
        let user_directory_service = Arc::new(UserDirectoryService::new(
            auth.clone(),
            store,
            notifier,
            profile_list_cache,
            profile_cache,
        ));

        Ok(Self {
            auth,
            pool,
            favorite_service,
            favorites_list_service,
            book_service,
            user_directory_service,
        })
    }
}
