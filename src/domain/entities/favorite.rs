use crate::domain::value_objects::{BookId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ユーザーと書籍の組に対するお気に入りフラグを表すドメインエンティティ。
///
/// `(book_id, user_id)` の組につき高々 1 レコード。書き込みは常に
/// この組をキーとした upsert で行う。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    user_id: UserId,
    book_id: BookId,
    favorited: bool,
    updated_at: DateTime<Utc>,
}

impl Favorite {
    /// 現在時刻で新しいお気に入りレコードを作成する。
    pub fn new(user_id: UserId, book_id: BookId, favorited: bool) -> Self {
        Self {
            user_id,
            book_id,
            favorited,
            updated_at: Utc::now(),
        }
    }

    /// 既存レコードからお気に入りを復元する。
    pub fn from_parts(
        user_id: UserId,
        book_id: BookId,
        favorited: bool,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            book_id,
            favorited,
            updated_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn favorited(&self) -> bool {
        self.favorited
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
