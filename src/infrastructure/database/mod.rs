pub mod connection_pool;
pub mod repository;
pub mod sqlite_store;

pub use connection_pool::ConnectionPool;
pub use repository::Repository;
pub use sqlite_store::SqliteStore;
