use crate::domain::entities::ProfileSummary;
use crate::domain::value_objects::{BookId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 蔵書一冊を表すエンティティ。
///
/// `added_by` は登録者プロフィールの抜粋で、一覧表示時に JOIN して埋める。
/// 単体取得など JOIN しない経路では `None` のままになる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub image_url: Option<String>,
    pub user_id: UserId,
    pub added_by: Option<ProfileSummary>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// 現在時刻と新規 ID で蔵書を作成する。
    pub fn new(
        title: String,
        author: String,
        genre: Option<String>,
        image_url: Option<String>,
        user_id: UserId,
    ) -> Self {
        Self {
            id: BookId::random(),
            title,
            author,
            genre,
            image_url,
            user_id,
            added_by: None,
            created_at: Utc::now(),
        }
    }
}
