use crate::shared::error::AppError;
use async_trait::async_trait;

/// 保存済みオブジェクトの所在。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub public_url: String,
}

/// 画像などのバイナリを預けるオブジェクトストレージのポート。
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// `path` にオブジェクトを保存し、公開 URL を返す。
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<StoredObject, AppError>;

    /// オブジェクトを削除する。存在しない場合もエラーにしない。
    async fn delete(&self, path: &str) -> Result<(), AppError>;
}
