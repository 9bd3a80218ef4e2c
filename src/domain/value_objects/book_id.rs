use serde::{Deserialize, Serialize};
use std::fmt;

/// Book エンティティの識別子。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(String);

impl BookId {
    /// 既存の識別子文字列から `BookId` を生成する。
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("BookId cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// 新規 BookId を生成する。
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// 内部の文字列を参照する。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BookId> for String {
    fn from(value: BookId) -> Self {
        value.0
    }
}
