use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// ローカルデータ（DB ファイル・アップロード画像）の配置先。
    pub data_dir: PathBuf,
    /// アップロード済み画像の公開 URL の前置部。
    pub public_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("./data"))
            .join("shiori");
        let url = format!("sqlite://{}/shiori.db?mode=rwc", data_dir.display());

        Self {
            database: DatabaseConfig {
                url,
                max_connections: 5,
                connection_timeout: 30,
            },
            storage: StorageConfig {
                data_dir,
                public_base_url: "https://storage.local/books".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// テスト用に任意のディレクトリ配下で完結する設定を作る。
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let url = format!("sqlite://{}/shiori.db?mode=rwc", data_dir.display());
        Self {
            database: DatabaseConfig {
                url,
                max_connections: 5,
                connection_timeout: 30,
            },
            storage: StorageConfig {
                data_dir,
                public_base_url: "https://storage.local/books".to_string(),
            },
        }
    }
}
