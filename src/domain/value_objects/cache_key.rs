use super::{BookId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// クエリキャッシュのエントリを指すキー。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// 書籍ごとのお気に入り状態。
    pub fn favorite(book_id: &BookId) -> Self {
        Self(format!("favorite:{book_id}"))
    }

    /// お気に入り書籍の一覧。
    pub fn favorites_list() -> Self {
        Self("favorites-list".to_string())
    }

    /// 蔵書の一覧。
    pub fn books() -> Self {
        Self("books".to_string())
    }

    /// 会員プロフィールの一覧。
    pub fn profiles() -> Self {
        Self("profiles".to_string())
    }

    /// 個別プロフィール。
    pub fn profile(user_id: &UserId) -> Self {
        Self(format!("profile:{user_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Cache key cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
