use crate::application::ports::auth_gateway::AuthGateway;
use crate::application::ports::notifier::Notifier;
use crate::application::ports::object_storage::ObjectStorage;
use crate::application::ports::repositories::{BookRepository, BookUpdate};
use crate::domain::entities::Book;
use crate::domain::value_objects::{BookId, CacheKey, UserId};
use crate::infrastructure::cache::{QueryCache, QueryState};
use crate::shared::error::AppError;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// カバー画像のアップロード入力。
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 蔵書の新規登録入力。
#[derive(Debug, Clone)]
pub struct NewBookInput {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub cover_image: Option<CoverImage>,
}

/// 蔵書インベントリのアプリケーションサービス。
///
/// 各ミューテーションは成功時に `books` キャッシュを無効化し、
/// 結果を Notifier 経由で通知する。
pub struct BookService {
    auth: Arc<dyn AuthGateway>,
    books: Arc<dyn BookRepository>,
    storage: Arc<dyn ObjectStorage>,
    notifier: Arc<dyn Notifier>,
    list_cache: Arc<QueryCache<Vec<Book>>>,
}

impl BookService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        books: Arc<dyn BookRepository>,
        storage: Arc<dyn ObjectStorage>,
        notifier: Arc<dyn Notifier>,
        list_cache: Arc<QueryCache<Vec<Book>>>,
    ) -> Self {
        Self {
            auth,
            books,
            storage,
            notifier,
            list_cache,
        }
    }

    /// 蔵書一覧を返す。登録者プロフィール付き・新しい順。
    ///
    /// `books` キーでキャッシュし、無効化されるまで再読込しない。
    pub async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        let key = CacheKey::books();
        loop {
            if let QueryState::Settled(books) = self.list_cache.read(&key) {
                if !self.list_cache.is_stale(&key) {
                    return Ok(books);
                }
            }

            match self.list_cache.begin_fetch(&key) {
                Some(token) => match self.books.list_books().await {
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

    /// 蔵書を登録する。要ログイン。カバー画像があれば先にストレージへ
    /// 保存し、公開 URL を行に持たせる。
    pub async fn add_book(&self, input: NewBookInput) -> Result<Book, AppError> {
        match self.try_add_book(input).await {
            Ok(book) => {
                self.list_cache.invalidate(&CacheKey::books());
                self.notifier.success("Book added to your shelf").await;
                info!("Added book: {} ({})", book.title, book.id);
                Ok(book)
            }
            Err(err) => {
                self.notifier
                    .failure(&format!("Failed to add book: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    /// 蔵書を部分更新する。
    pub async fn update_book(&self, book_id: &BookId, update: BookUpdate) -> Result<(), AppError> {
        match self.books.update_book(book_id, &update).await {
            Ok(()) => {
                self.list_cache.invalidate(&CacheKey::books());
                self.notifier.success("Book updated successfully").await;
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .failure(&format!("Failed to update book: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    /// 蔵書を削除する。
    pub async fn delete_book(&self, book_id: &BookId) -> Result<(), AppError> {
        match self.books.delete_book(book_id).await {
            Ok(()) => {
                self.list_cache.invalidate(&CacheKey::books());
                self.notifier.success("Book removed from library").await;
                info!("Removed book: {}", book_id);
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .failure(&format!("Failed to remove book: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    async fn try_add_book(&self, input: NewBookInput) -> Result<Book, AppError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("title is required".into()));
        }
        let author = input.author.trim();
        if author.is_empty() {
            return Err(AppError::InvalidInput("author is required".into()));
        }

        let user = self.auth.current_user().await?.ok_or_else(|| {
            AppError::Unauthorized("login required to add books".into())
        })?;

        let image_url = match input.cover_image {
            Some(image) => Some(self.upload_cover(&user.id, image).await?),
            None => None,
        };

        let book = Book::new(
            title.to_string(),
            author.to_string(),
            input.genre,
            image_url,
            user.id,
        );
        self.books.insert_book(&book).await?;
        Ok(book)
    }

    async fn upload_cover(&self, user_id: &UserId, image: CoverImage) -> Result<String, AppError> {
        let ext = Path::new(&image.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        // ユーザーごとのディレクトリにタイムスタンプで格納する
        let path = format!("{}/{}.{}", user_id, Utc::now().timestamp_millis(), ext);
        let stored = self.storage.store(&path, &image.bytes).await?;
        Ok(stored.public_url)
    }
}
