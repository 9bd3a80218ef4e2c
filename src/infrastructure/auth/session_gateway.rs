use crate::application::ports::auth_gateway::{AuthGateway, AuthUser};
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// プロセス内セッションを持つ AuthGateway 実装。
///
/// バックエンドのセッション API の代わりに、ログイン済みユーザーを
/// メモリ上で保持する。未ログインは `None` でありエラーではない。
#[derive(Default)]
pub struct SessionAuthGateway {
    session: RwLock<Option<AuthUser>>,
}

impl SessionAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, user: AuthUser) {
        info!("Signed in: {}", user.id);
        *self.session.write().await = Some(user);
    }

    pub async fn sign_out(&self) {
        if let Some(user) = self.session.write().await.take() {
            info!("Signed out: {}", user.id);
        }
    }
}

#[async_trait]
impl AuthGateway for SessionAuthGateway {
    async fn current_user(&self) -> Result<Option<AuthUser>, AppError> {
        Ok(self.session.read().await.clone())
    }
}
