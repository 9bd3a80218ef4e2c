use crate::domain::value_objects::UserId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// 認証済みセッションのユーザー情報。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// セッション状態を問い合わせるポート。
///
/// `Err` はトランスポート障害。匿名（未ログイン）は `Ok(None)` であり
/// エラーではない。
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn current_user(&self) -> Result<Option<AuthUser>, AppError>;
}
