use super::SqliteStore;
use super::queries::{DELETE_BOOK, INSERT_BOOK, SELECT_BOOKS, SELECT_BOOK_BY_ID, UPDATE_BOOK};
use crate::application::ports::repositories::{BookRepository, BookUpdate};
use crate::domain::entities::{Book, ProfileSummary};
use crate::domain::value_objects::{BookId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::FromRow;
use tracing::info;

#[derive(Debug, FromRow)]
pub(super) struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub image_url: Option<String>,
    pub user_id: String,
    pub created_at: i64,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub avatar_url: Option<String>,
}

impl BookRow {
    pub(super) fn into_domain(self) -> Result<Book, AppError> {
        let id = BookId::new(self.id)
            .map_err(|err| AppError::ValidationError(format!("Invalid BookId: {err}")))?;
        let user_id = UserId::new(self.user_id)
            .map_err(|err| AppError::ValidationError(format!("Invalid UserId: {err}")))?;
        let created_at = Utc
            .timestamp_millis_opt(self.created_at)
            .single()
            .ok_or_else(|| AppError::ValidationError("Invalid timestamp".to_string()))?;

        // JOIN が全カラム NULL のときは登録者プロフィール無しとみなす
        let added_by = if self.firstname.is_none()
            && self.lastname.is_none()
            && self.avatar_url.is_none()
        {
            None
        } else {
            Some(ProfileSummary {
                firstname: self.firstname,
                lastname: self.lastname,
                avatar_url: self.avatar_url,
            })
        };

        Ok(Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            image_url: self.image_url,
            user_id,
            added_by,
            created_at,
        })
    }
}

#[async_trait]
impl BookRepository for SqliteStore {
    async fn insert_book(&self, book: &Book) -> Result<(), AppError> {
        sqlx::query(INSERT_BOOK)
            .bind(book.id.as_str())
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.genre)
            .bind(&book.image_url)
            .bind(book.user_id.as_str())
            .bind(book.created_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        info!("Inserted book: {} ({})", book.title, book.id);
        Ok(())
    }

    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, AppError> {
        let row = sqlx::query_as::<_, BookRow>(SELECT_BOOK_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(BookRow::into_domain).transpose()
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        let rows = sqlx::query_as::<_, BookRow>(SELECT_BOOKS)
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.into_iter().map(BookRow::into_domain).collect()
    }

    async fn update_book(&self, id: &BookId, update: &BookUpdate) -> Result<(), AppError> {
        let result = sqlx::query(UPDATE_BOOK)
            .bind(id.as_str())
            .bind(&update.title)
            .bind(&update.author)
            .bind(&update.genre)
            .bind(&update.image_url)
            .execute(self.pool.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book not found: {id}")));
        }
        Ok(())
    }

    async fn delete_book(&self, id: &BookId) -> Result<(), AppError> {
        sqlx::query(DELETE_BOOK)
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;

        info!("Deleted book: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{ConnectionPool, Repository};

    async fn setup_store() -> SqliteStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        let store = SqliteStore::new(pool);
        store.initialize().await.unwrap();
        store
    }

    fn sample_book(title: &str) -> Book {
        Book::new(
            title.to_string(),
            "Author".to_string(),
            Some("SF".to_string()),
            None,
            UserId::new("u1".to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn list_books_is_newest_first() {
        let store = setup_store().await;

        let mut older = sample_book("Older");
        older.created_at = Utc.timestamp_millis_opt(1_000).single().unwrap();
        let mut newer = sample_book("Newer");
        newer.created_at = Utc.timestamp_millis_opt(2_000).single().unwrap();

        store.insert_book(&older).await.unwrap();
        store.insert_book(&newer).await.unwrap();

        let books = store.list_books().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Newer");
        assert_eq!(books[1].title, "Older");
    }

    #[tokio::test]
    async fn partial_update_keeps_unset_fields() {
        let store = setup_store().await;
        let book = sample_book("Original");
        store.insert_book(&book).await.unwrap();

        let update = BookUpdate {
            title: Some("Renamed".to_string()),
            ..BookUpdate::default()
        };
        store.update_book(&book.id, &update).await.unwrap();

        let stored = store.get_book(&book.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        // 未指定フィールドは据え置き
        assert_eq!(stored.author, "Author");
        assert_eq!(stored.genre.as_deref(), Some("SF"));
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let store = setup_store().await;
        let id = BookId::new("missing".to_string()).unwrap();
        let result = store.update_book(&id, &BookUpdate::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
