use super::SqliteStore;
use super::books::BookRow;
use super::queries::{SELECT_FAVORITE, SELECT_FAVORITED_BOOKS, UPSERT_FAVORITE};
use crate::application::ports::repositories::FavoriteRepository;
use crate::domain::entities::{Book, Favorite};
use crate::domain::value_objects::{BookId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::FromRow;
use tracing::info;

#[derive(Debug, FromRow)]
struct FavoriteRow {
    user_id: String,
    book_id: String,
    favorited: bool,
    updated_at: i64,
}

impl FavoriteRow {
    fn into_domain(self) -> Result<Favorite, AppError> {
        let user_id = UserId::new(self.user_id)
            .map_err(|err| AppError::ValidationError(format!("Invalid UserId: {err}")))?;
        let book_id = BookId::new(self.book_id)
            .map_err(|err| AppError::ValidationError(format!("Invalid BookId: {err}")))?;
        let updated_at = Utc
            .timestamp_millis_opt(self.updated_at)
            .single()
            .ok_or_else(|| AppError::ValidationError("Invalid timestamp".to_string()))?;

        Ok(Favorite::from_parts(user_id, book_id, self.favorited, updated_at))
    }
}

#[async_trait]
impl FavoriteRepository for SqliteStore {
    async fn find_favorite(
        &self,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<Option<Favorite>, AppError> {
        let row = sqlx::query_as::<_, FavoriteRow>(SELECT_FAVORITE)
            .bind(user_id.as_str())
            .bind(book_id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(FavoriteRow::into_domain).transpose()
    }

    async fn upsert_favorite(
        &self,
        user_id: &UserId,
        book_id: &BookId,
        favorited: bool,
    ) -> Result<(), AppError> {
        sqlx::query(UPSERT_FAVORITE)
            .bind(user_id.as_str())
            .bind(book_id.as_str())
            .bind(favorited)
            .bind(Utc::now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        info!("Upserted favorite: {} for book: {} = {}", user_id, book_id, favorited);
        Ok(())
    }

    async fn list_favorited_books(&self, user_id: &UserId) -> Result<Vec<Book>, AppError> {
        let rows = sqlx::query_as::<_, BookRow>(SELECT_FAVORITED_BOOKS)
            .bind(user_id.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.into_iter().map(BookRow::into_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::repositories::BookRepository;
    use crate::infrastructure::database::{ConnectionPool, Repository};

    async fn setup_store() -> SqliteStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        let store = SqliteStore::new(pool);
        store.initialize().await.unwrap();
        store
    }

    async fn seed_profile(store: &SqliteStore, id: &str, account_type: &str) {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, firstname, lastname, avatar_url, account_type, updated_at)
            VALUES (?1, ?2, ?3, NULL, ?4, ?5)
            "#,
        )
        .bind(id)
        .bind("Taro")
        .bind("Yamada")
        .bind(account_type)
        .bind(Utc::now().timestamp_millis())
        .execute(store.pool.get_pool())
        .await
        .unwrap();
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    async fn seed_book(store: &SqliteStore, owner: &str, title: &str) -> Book {
        let book = Book::new(
            title.to_string(),
            "Author".to_string(),
            None,
            None,
            user(owner),
        );
        store.insert_book(&book).await.unwrap();
        book
    }

    #[tokio::test]
    async fn find_favorite_returns_none_without_record() {
        let store = setup_store().await;
        let found = store
            .find_favorite(&user("u1"), &BookId::new("b1".to_string()).unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_user_book_pair() {
        let store = setup_store().await;
        seed_profile(&store, "u1", "Member").await;
        let book = seed_book(&store, "u1", "Norwegian Wood").await;

        store.upsert_favorite(&user("u1"), &book.id, true).await.unwrap();
        // 2 回目は insert ではなく update になる
        store.upsert_favorite(&user("u1"), &book.id, false).await.unwrap();

        let found = store
            .find_favorite(&user("u1"), &book.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!found.favorited());
    }

    #[tokio::test]
    async fn favorited_books_lists_only_true_flags() {
        let store = setup_store().await;
        seed_profile(&store, "u1", "Member").await;
        let liked = seed_book(&store, "u1", "Liked").await;
        let unliked = seed_book(&store, "u1", "Unliked").await;

        store.upsert_favorite(&user("u1"), &liked.id, true).await.unwrap();
        store.upsert_favorite(&user("u1"), &unliked.id, false).await.unwrap();

        let books = store.list_favorited_books(&user("u1")).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, liked.id);
        // 登録者プロフィールも JOIN されている
        assert!(books[0].added_by.is_some());
    }

    #[tokio::test]
    async fn favorites_are_scoped_per_user() {
        let store = setup_store().await;
        seed_profile(&store, "u1", "Member").await;
        let book = seed_book(&store, "u1", "Shared Book").await;

        store.upsert_favorite(&user("u1"), &book.id, true).await.unwrap();

        let other = store.list_favorited_books(&user("u2")).await.unwrap();
        assert!(other.is_empty());
    }
}
