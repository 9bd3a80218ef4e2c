use serde::{Deserialize, Serialize};
use std::fmt;

/// プロフィールの権限区分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Admin,
    Staff,
    Member,
    Unknown(String),
}

impl AccountType {
    pub fn as_str(&self) -> &str {
        match self {
            AccountType::Admin => "Admin",
            AccountType::Staff => "Staff",
            AccountType::Member => "Member",
            AccountType::Unknown(value) => value.as_str(),
        }
    }

    /// 蔵書・会員ディレクトリの管理操作を許可するか。
    pub fn can_manage_directory(&self) -> bool {
        matches!(self, AccountType::Admin | AccountType::Staff)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for AccountType {
    fn from(value: &str) -> Self {
        match value {
            "Admin" => AccountType::Admin,
            "Staff" => AccountType::Staff,
            "Member" => AccountType::Member,
            other => AccountType::Unknown(other.to_string()),
        }
    }
}
