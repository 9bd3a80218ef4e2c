use crate::domain::value_objects::{AccountType, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 会員ディレクトリに載るプロフィール。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub avatar_url: Option<String>,
    pub account_type: AccountType,
    pub updated_at: DateTime<Utc>,
}

/// 一覧表示用のプロフィール抜粋。蔵書の登録者欄などに埋め込む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub avatar_url: Option<String>,
}

/// 自分のプロフィール。メールアドレスはセッション側から補完する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileWithEmail {
    pub profile: Profile,
    pub email: Option<String>,
}
