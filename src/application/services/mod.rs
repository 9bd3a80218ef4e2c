pub mod book_service;
pub mod favorite_service;
pub mod favorites_list_service;
pub mod user_directory_service;

pub use book_service::{BookService, CoverImage, NewBookInput};
pub use favorite_service::{FavoriteService, FavoriteView, ToggleTicket};
pub use favorites_list_service::FavoritesListService;
pub use user_directory_service::UserDirectoryService;
