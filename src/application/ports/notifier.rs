use async_trait::async_trait;

/// 操作結果をユーザーへ通知するポート（トースト相当）。
///
/// 通知は補助的な副作用であり、失敗しても呼び出し元の結果に影響させない。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn success(&self, message: &str);
    async fn failure(&self, message: &str);
}
