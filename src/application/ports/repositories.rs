use crate::domain::entities::{Book, Favorite, Profile};
use crate::domain::value_objects::{BookId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// 蔵書の部分更新。`None` のフィールドは変更しない。
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub image_url: Option<String>,
}

/// プロフィールの部分更新。`None` のフィールドは変更しない。
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub avatar_url: Option<String>,
    pub account_type: Option<String>,
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert_book(&self, book: &Book) -> Result<(), AppError>;
    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, AppError>;
    /// 登録者プロフィールを JOIN した一覧を新しい順で返す。
    async fn list_books(&self) -> Result<Vec<Book>, AppError>;
    async fn update_book(&self, id: &BookId, update: &BookUpdate) -> Result<(), AppError>;
    async fn delete_book(&self, id: &BookId) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: &UserId) -> Result<Option<Profile>, AppError>;
    /// `updated_at` の新しい順で全プロフィールを返す。
    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;
    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<(), AppError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn find_favorite(
        &self,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<Option<Favorite>, AppError>;

    /// `(book_id, user_id)` をキーとした upsert。既存レコードの有無を
    /// 呼び出し側が気にする必要はない。
    async fn upsert_favorite(
        &self,
        user_id: &UserId,
        book_id: &BookId,
        favorited: bool,
    ) -> Result<(), AppError>;

    /// `favorited = true` のレコードを書籍に JOIN して返す。
    async fn list_favorited_books(&self, user_id: &UserId) -> Result<Vec<Book>, AppError>;
}
