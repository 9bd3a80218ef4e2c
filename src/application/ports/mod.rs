pub mod auth_gateway;
pub mod notifier;
pub mod object_storage;
pub mod repositories;
