pub mod account_type;
pub mod book_id;
pub mod cache_key;
pub mod user_id;

pub use account_type::AccountType;
pub use book_id::BookId;
pub use cache_key::CacheKey;
pub use user_id::UserId;
